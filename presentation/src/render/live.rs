//! Live view of a streaming answer
//!
//! Implements [`ChatProgressNotifier`]: a "Thinking..." spinner until the
//! first text arrives, then the accumulated Markdown re-rendered in place on
//! every update. When the answer ends the live frame is replaced by the full
//! rendering, which stays in the terminal scrollback.

use super::{MarkdownRenderer, display_width};
use balikci_application::ChatProgressNotifier;
use colored::Colorize;
use crossterm::{
    cursor::{MoveToColumn, MoveToPreviousLine},
    queue,
    terminal::{self, Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const CURSOR_GLYPH: &str = "▌";
const FALLBACK_COLUMNS: usize = 80;

/// Which rows of the live frame are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Keep the newest rows in view while the answer grows.
    pub follow_tail: bool,
    /// Maximum rows drawn while following; 0 means unlimited.
    pub height: usize,
}

impl Viewport {
    pub fn new(follow_tail: bool, height: usize) -> Self {
        Self {
            follow_tail,
            height,
        }
    }

    /// Size the viewport to the current terminal, leaving room for the
    /// prompt line.
    pub fn from_terminal(follow_tail: bool) -> Self {
        let height = terminal::size()
            .map(|(_, rows)| usize::from(rows).saturating_sub(2))
            .unwrap_or(0);
        Self::new(follow_tail, height)
    }

    /// The tail of `lines` that fits, or all of them when not following.
    pub fn visible<'a, T>(&self, lines: &'a [T]) -> &'a [T] {
        if self.follow_tail && self.height > 0 && lines.len() > self.height {
            &lines[lines.len() - self.height..]
        } else {
            lines
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(true, 0)
    }
}

struct LiveState {
    out: Box<dyn Write + Send>,
    spinner: Option<ProgressBar>,
    /// Terminal rows occupied by the frame currently on screen.
    drawn_rows: usize,
    /// Accumulated answer text.
    text: String,
}

/// Renders one answer as it streams in.
///
/// Create one per turn. On a non-terminal writer nothing is redrawn; only
/// the final answer (or error) is written.
pub struct LiveStreamView {
    renderer: MarkdownRenderer,
    viewport: Viewport,
    interactive: bool,
    show_spinner: bool,
    state: Mutex<LiveState>,
}

impl LiveStreamView {
    /// View writing to stdout.
    pub fn new(viewport: Viewport) -> Self {
        let interactive = io::stdout().is_terminal();
        Self::with_writer(Box::new(io::stdout()), interactive, viewport)
    }

    /// View writing to `out`. `interactive` enables in-place redraws.
    pub fn with_writer(out: Box<dyn Write + Send>, interactive: bool, viewport: Viewport) -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
            viewport,
            interactive,
            show_spinner: interactive,
            state: Mutex::new(LiveState {
                out,
                spinner: None,
                drawn_rows: 0,
                text: String::new(),
            }),
        }
    }

    /// Disable the "Thinking..." spinner.
    pub fn without_spinner(mut self) -> Self {
        self.show_spinner = false;
        self
    }

    fn lock(&self) -> MutexGuard<'_, LiveState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(state: &mut LiveState) {
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Remove the frame currently on screen.
    fn erase(&self, state: &mut LiveState) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        if state.drawn_rows > 0 {
            let rows = u16::try_from(state.drawn_rows).unwrap_or(u16::MAX);
            queue!(state.out, MoveToPreviousLine(rows))?;
        } else {
            queue!(state.out, MoveToColumn(0))?;
        }
        queue!(state.out, Clear(ClearType::FromCursorDown))?;
        state.drawn_rows = 0;
        Ok(())
    }

    fn draw_frame(&self, state: &mut LiveState, text: &str) -> io::Result<()> {
        let rendered = self.renderer.render(text);
        let mut lines: Vec<String> = rendered.split('\n').map(str::to_string).collect();
        if let Some(last) = lines.last_mut() {
            last.push_str(&CURSOR_GLYPH.dimmed().to_string());
        }

        let columns = terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_COLUMNS)
            .max(1);

        let mut rows = 0;
        for line in self.viewport.visible(&lines) {
            writeln!(state.out, "{}", line)?;
            rows += display_width(line).div_ceil(columns).max(1);
        }
        state.drawn_rows = rows;
        state.out.flush()
    }

    fn update(&self, text: &str) -> io::Result<()> {
        let mut state = self.lock();
        Self::clear_spinner(&mut state);
        state.text.clear();
        state.text.push_str(text);
        if !self.interactive {
            return Ok(());
        }
        self.erase(&mut state)?;
        self.draw_frame(&mut state, text)
    }

    /// Replace the live frame with `final_text` (or nothing).
    fn finish(&self, final_text: Option<String>) -> io::Result<()> {
        let mut state = self.lock();
        Self::clear_spinner(&mut state);
        self.erase(&mut state)?;
        state.text.clear();
        if let Some(text) = final_text {
            writeln!(state.out, "{}", text)?;
        }
        state.out.flush()
    }
}

impl ChatProgressNotifier for LiveStreamView {
    fn on_request_start(&self) {
        if !self.show_spinner {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.lock().spinner = Some(spinner);
    }

    fn on_stream_start(&self) {
        Self::clear_spinner(&mut self.lock());
    }

    fn on_stream_update(&self, text: &str) {
        let _ = self.update(text);
    }

    fn on_stream_end(&self) {
        let text = std::mem::take(&mut self.lock().text);
        let _ = self.finish(Some(self.renderer.render(&text)));
    }

    fn on_cancelled(&self) {
        let _ = self.finish(None);
    }

    fn on_error(&self, text: &str) {
        let _ = self.finish(Some(text.red().to_string()));
    }
}
