//! Terminal rendering of answers
//!
//! - [`MarkdownRenderer`] turns Markdown into ANSI-styled text
//! - [`LiveStreamView`] redraws a streaming answer in place
//! - [`Viewport`] decides which rows of a long answer stay visible

mod live;
mod markdown;

pub use live::{LiveStreamView, Viewport};
pub use markdown::MarkdownRenderer;

/// Remove ANSI SGR escape sequences (`ESC [ ... m`).
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Number of terminal columns a styled line occupies (one per char).
pub fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;36mTitle\x1b[0m plain"), "Title plain");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }

    #[test]
    fn test_display_width_counts_chars() {
        assert_eq!(display_width("\x1b[33mbalıkçı\x1b[0m"), 7);
    }
}
