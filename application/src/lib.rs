//! Application layer for balikci
//!
//! This crate contains the chat use case, port definitions, and per-turn
//! parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ChatParams;
pub use ports::{
    chat_progress::{ChatProgressNotifier, NoChatProgress},
    completion_gateway::{
        Completion, CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    key_value_store::{KeyValueStore, StoreError},
};
pub use use_cases::chat_service::{
    ChatService, EMPTY_COMPLETION_FALLBACK, ERROR_PREFIX, IgnoreReason, SendOutcome,
};
pub use use_cases::conversation_store::{ConversationStore, HISTORY_KEY, WELCOME_KEY};
