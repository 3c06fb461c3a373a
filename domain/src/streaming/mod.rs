//! Streaming primitives.
//!
//! - [`stream::StreamEvent`]: events flowing from a completion stream
//! - [`typing::TypingEffect`]: client-side replay of a finished text

pub mod stream;
pub mod typing;
