//! Prompt domain
//!
//! The tutor persona and assembly of the message list sent with each turn.

mod template;

pub use template::{PromptMessage, TutorPrompt};
