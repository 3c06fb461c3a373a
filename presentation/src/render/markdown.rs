//! Markdown to ANSI terminal rendering.
//!
//! Answers are rendered again on every streamed update, so the input is
//! often cut off mid-construct (an open code fence, half a table). The
//! renderer never assumes a block is closed; pulldown-cmark closes open
//! blocks at end of input and the output is simply what has arrived so far.

use colored::{ColoredString, Colorize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

const RULE_WIDTH: usize = 40;
const QUOTE_PREFIX: &str = "│ ";

/// Open element on the render stack. Every `Start` event pushes one entry
/// and every `End` event pops one.
#[derive(Debug)]
enum Open {
    Paragraph,
    Heading(HeadingLevel),
    Quote,
    List,
    Item,
    CodeBlock,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
    Table,
    TableRow,
    TableCell,
    Other,
}

#[derive(Debug, Default)]
struct TableBuffer {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    header_rows: usize,
}

#[derive(Debug, Default)]
struct CodeBuffer {
    lang: String,
    text: String,
}

/// Renders Markdown into styled terminal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        let mut state = RenderState::default();
        for event in Parser::new_ext(markdown, options) {
            state.handle(event);
        }
        state.finish()
    }
}

#[derive(Default)]
struct RenderState {
    out: String,
    line: String,
    stack: Vec<Open>,
    /// Next number for each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    code: Option<CodeBuffer>,
    table: Option<TableBuffer>,
    /// A blank line is owed before the next output line.
    pending_blank: bool,
}

impl RenderState {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.line.push_str(&"─".repeat(RULE_WIDTH).dimmed().to_string());
                self.flush_line();
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                self.line.push_str(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => {
                self.flush_line();
                Open::Heading(level)
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                Open::Quote
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBuffer {
                    lang,
                    text: String::new(),
                });
                Open::CodeBlock
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
                Open::List
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}.", n);
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.line.push_str(&"  ".repeat(depth));
                self.line.push_str(&marker.cyan().to_string());
                self.line.push(' ');
                Open::Item
            }
            Tag::Emphasis => Open::Emphasis,
            Tag::Strong => Open::Strong,
            Tag::Strikethrough => Open::Strikethrough,
            Tag::Link { dest_url, .. } => Open::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => {
                self.line.push_str(&"[image: ".dimmed().to_string());
                Open::Image(dest_url.to_string())
            }
            Tag::Table(_) => {
                self.flush_line();
                self.table = Some(TableBuffer::default());
                Open::Table
            }
            Tag::TableHead | Tag::TableRow => Open::TableRow,
            Tag::TableCell => Open::TableCell,
            _ => Open::Other,
        };
        self.stack.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };

        match open {
            Open::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            Open::Heading(_) => {
                self.flush_line();
                self.blank_line();
            }
            Open::Quote => {
                self.flush_line();
                if !self.in_quote() {
                    self.blank_line();
                }
            }
            Open::CodeBlock => self.finish_code_block(),
            Open::List => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            Open::Item => self.flush_line(),
            Open::Link(url) => {
                if !url.is_empty() && !self.line_ends_with_plain(&url) {
                    self.line
                        .push_str(&format!(" ({})", url).dimmed().to_string());
                }
            }
            Open::Image(url) => {
                self.line
                    .push_str(&format!("] ({})", url).dimmed().to_string());
            }
            Open::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            Open::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    if row.is_empty() {
                        return;
                    }
                    if table.rows.is_empty() {
                        table.header_rows = 1;
                    }
                    table.rows.push(row);
                }
            }
            Open::Table => self.finish_table(),
            Open::Emphasis | Open::Strong | Open::Strikethrough | Open::Other => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(text);
            return;
        }
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
            return;
        }
        let styled = self.styled(text);
        self.line.push_str(&styled);
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(code);
            return;
        }
        self.line.push_str(&code.bright_yellow().to_string());
    }

    fn styled(&self, text: &str) -> String {
        let mut s: ColoredString = text.normal();

        if let Some(level) = self.heading() {
            s = match level {
                HeadingLevel::H1 => s.bold().underline().bright_cyan(),
                HeadingLevel::H2 => s.bold().cyan(),
                HeadingLevel::H3 => s.bold(),
                _ => s.bold().italic(),
            };
        }
        if self.has(|o| matches!(o, Open::Strong)) {
            s = s.bold();
        }
        if self.has(|o| matches!(o, Open::Emphasis)) {
            s = s.italic();
        }
        if self.has(|o| matches!(o, Open::Strikethrough)) {
            s = s.strikethrough();
        }
        if self.has(|o| matches!(o, Open::Link(_))) {
            s = s.underline().blue();
        }
        if self.in_quote() {
            s = s.dimmed().italic();
        }

        s.to_string()
    }

    fn has(&self, pred: impl Fn(&Open) -> bool) -> bool {
        self.stack.iter().any(pred)
    }

    fn heading(&self) -> Option<HeadingLevel> {
        self.stack.iter().find_map(|o| match o {
            Open::Heading(level) => Some(*level),
            _ => None,
        })
    }

    fn in_quote(&self) -> bool {
        self.has(|o| matches!(o, Open::Quote))
    }

    fn quote_prefix(&self) -> String {
        let depth = self.stack.iter().filter(|o| matches!(o, Open::Quote)).count();
        QUOTE_PREFIX.repeat(depth).dimmed().to_string()
    }

    /// Autolinks already show the URL as their text.
    fn line_ends_with_plain(&self, url: &str) -> bool {
        super::strip_ansi(&self.line).ends_with(url)
    }

    fn flush_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.line);
        self.push_output_line(&line);
    }

    fn push_output_line(&mut self, line: &str) {
        let prefix = if self.in_quote() {
            self.quote_prefix()
        } else {
            String::new()
        };
        if std::mem::take(&mut self.pending_blank) {
            self.out.push_str(prefix.trim_end());
            self.out.push('\n');
        }
        self.out.push_str(&prefix);
        self.out.push_str(line);
        self.out.push('\n');
    }

    /// Separate the next output line from what came before. Nothing is
    /// written until that line exists, so blocks never end in a blank line.
    fn blank_line(&mut self) {
        if !self.out.is_empty() {
            self.pending_blank = true;
        }
    }

    fn finish_code_block(&mut self) {
        let Some(code) = self.code.take() else {
            return;
        };
        let body = code.text.trim_end_matches('\n');

        if !body.contains('\n') {
            // Single-line blocks read better inline.
            if !body.trim().is_empty() {
                let line = body.trim().bright_yellow().to_string();
                self.push_output_line(&line);
            }
        } else {
            let lang = if code.lang.is_empty() {
                "code"
            } else {
                code.lang.as_str()
            };
            let header = format!("── {} ──", lang).dimmed().to_string();
            self.push_output_line(&header);
            for line in body.lines() {
                let line = format!("  {}", line).green().to_string();
                self.push_output_line(&line);
            }
        }
        if self.lists.is_empty() {
            self.blank_line();
        }
    }

    fn finish_table(&mut self) {
        let Some(mut table) = self.table.take() else {
            return;
        };
        // A row cut off by the end of a partial stream.
        if !table.row.is_empty() {
            let row = std::mem::take(&mut table.row);
            table.rows.push(row);
        }

        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        for (r, row) in table.rows.iter().enumerate() {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or_default();
                    let padded = if i + 1 == columns {
                        cell.to_string()
                    } else {
                        format!("{:<width$}", cell, width = widths[i])
                    };
                    if r < table.header_rows {
                        padded.bold().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            let line = cells.join(&" │ ".dimmed().to_string());
            self.push_output_line(&line);

            if r + 1 == table.header_rows {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                let rule = rule.dimmed().to_string();
                self.push_output_line(&rule);
            }
        }
        self.blank_line();
    }

    fn finish(mut self) -> String {
        if let Some(code) = self.code.as_ref()
            && !code.text.is_empty()
        {
            self.finish_code_block();
        }
        if self.table.is_some() {
            self.finish_table();
        }
        self.flush_line();
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out
    }
}
