//! Infrastructure layer for balikci
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlConversationLogger;
pub use openrouter::{OpenRouterConfig, OpenRouterError, OpenRouterGateway};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
