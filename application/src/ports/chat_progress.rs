//! Chat progress port
//!
//! [`ChatProgressNotifier`] is an **output port** the presentation layer
//! implements to draw a turn while it is in flight: a loading indicator
//! before the first text, the growing answer, and error text.

/// Callbacks fired while a turn is in flight.
///
/// `on_stream_update` always receives the *whole* text accumulated so far,
/// not just the newest delta, so an implementation can re-render it from
/// scratch on every call.
pub trait ChatProgressNotifier: Send + Sync {
    /// The request has been sent; nothing has arrived yet.
    fn on_request_start(&self) {}

    /// The first piece of the answer is about to be shown.
    fn on_stream_start(&self) {}

    /// The accumulated answer changed.
    fn on_stream_update(&self, _text: &str) {}

    /// The answer is complete.
    fn on_stream_end(&self) {}

    /// The turn was cancelled; anything drawn for it should go away.
    fn on_cancelled(&self) {}

    /// The turn failed; `text` is the message that will be committed.
    fn on_error(&self, _text: &str) {}
}

/// No-op notifier for when progress display is not needed
pub struct NoChatProgress;

impl ChatProgressNotifier for NoChatProgress {}
