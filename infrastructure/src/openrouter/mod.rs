//! OpenRouter adapter
//!
//! Implements [`CompletionGateway`](balikci_application::CompletionGateway)
//! over the OpenRouter chat-completions HTTP API, both as one JSON body and
//! as a Server-Sent Events stream.

pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::OpenRouterError;
pub use gateway::{DEFAULT_BASE_URL, OpenRouterConfig, OpenRouterGateway};
