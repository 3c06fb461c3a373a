//! Typing effect for batched completions.
//!
//! When a completion arrives in one piece (non-streaming mode) the client
//! replays it a few characters at a time so it still reads like a live
//! answer. Larger chunks finish faster; `chunk_size = 1` types character by
//! character.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Replay settings for the typing effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingEffect {
    /// When false the whole text is shown at once.
    pub enabled: bool,
    /// Characters revealed per step.
    pub chunk_size: usize,
    /// Lower bound of the pause between steps, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the pause between steps, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for TypingEffect {
    fn default() -> Self {
        Self {
            enabled: true,
            chunk_size: 3,
            min_delay_ms: 1,
            max_delay_ms: 2,
        }
    }
}

impl TypingEffect {
    /// A disabled effect (text appears immediately).
    pub fn instant() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms))
    }

    /// Pause for a step, given a uniform sample `t` in `[0, 1]`.
    pub fn delay_at(&self, t: f64) -> Duration {
        let min = self.min_delay_ms as f64;
        let max = self.max_delay_ms.max(self.min_delay_ms) as f64;
        let t = t.clamp(0.0, 1.0);
        Duration::from_millis((min + (max - min) * t).round() as u64)
    }

    /// Split `text` into successive slices of `chunk_size` characters.
    ///
    /// Slices never split a UTF-8 character. A `chunk_size` of 0 behaves
    /// like 1.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            rest: text,
            size: self.chunk_size.max(1),
        }
    }
}

/// Iterator returned by [`TypingEffect::chunks`].
pub struct Chunks<'a> {
    rest: &'a str,
    size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .nth(self.size)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(head)
    }
}
