//! Application-level configuration.
//!
//! - [`ChatParams`]: per-turn request and presentation pacing parameters

pub mod chat_params;

pub use chat_params::ChatParams;
