//! Conversation domain.
//!
//! - [`entities::Message`]: a single role-tagged chat message
//! - [`entities::Conversation`]: the ordered, append-only message history

pub mod entities;
