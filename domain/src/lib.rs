//! Domain layer for balikci
//!
//! This crate contains the conversation entities, the tutor prompt, and the
//! streaming primitives. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Conversation**: an ordered, append-only list of role-tagged messages
//! - **Completion**: the text a hosted model produces for a conversation
//! - **Streaming**: incremental delivery of a completion as [`StreamEvent`]s,
//!   or a [`TypingEffect`] replay when the completion arrived in one piece

pub mod conversation;
pub mod core;
pub mod prompt;
pub mod streaming;
pub mod util;

// Re-export commonly used types
pub use conversation::entities::{Conversation, Message, Role};
pub use core::{error::DomainError, model::Model};
pub use prompt::{PromptMessage, TutorPrompt};
pub use streaming::{stream::StreamEvent, typing::TypingEffect};
