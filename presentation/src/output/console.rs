//! Console output formatter for the chat

use crate::render::MarkdownRenderer;
use balikci_domain::{Message, Model, Role};
use colored::Colorize;

/// Questions offered on an empty conversation.
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "When should I use a recursive function?",
    "What is the difference between pass by value and pass by reference?",
    "What is the difference between stack and heap memory?",
    "What is time complexity and how do I calculate it?",
];

const APP_NAME: &str = "Balıkçı";
const TAGLINE: &str = "Programming assistant";
const WIDTH: usize = 60;

/// Formats chat screens and messages for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// First-run banner.
    pub fn welcome() -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("🎣 {} - {}", APP_NAME, TAGLINE)));
        output.push_str("\n\n");
        output.push_str(&format!(
            "Hi! I'm a {} and I'm here to teach you programming.\n",
            "software lab assistant".bold()
        ));
        output.push_str(&format!(
            "I {} fix your code; I only show you where the mistake is.\n\n",
            "never".bold()
        ));
        output.push_str(&format!("{}", "Press Enter to get started.".dimmed()));
        output
    }

    /// Title, tagline and numbered example questions.
    pub fn empty_state() -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", APP_NAME.bold().cyan()));
        output.push_str(&format!("{}\n\n", TAGLINE.dimmed()));
        output.push_str(&format!("{}\n", "Try asking:".bold()));
        for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
            output.push_str(&format!("  {} {}\n", format!("[{}]", i + 1).cyan(), question));
        }
        output.push_str(&format!(
            "\n{}",
            "Type /ex <n> to use one, or /help for commands.".dimmed()
        ));
        output
    }

    /// About panel.
    pub fn about(model: &Model) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("ℹ️  About"));
        output.push('\n');
        output.push_str(&format!(
            "{} {} {}\n",
            APP_NAME.bold(),
            "version".dimmed(),
            env!("CARGO_PKG_VERSION")
        ));
        output.push_str(&format!("{} {}\n", "Model:".bold(), model));
        output.push_str(&format!(
            "{} {}\n",
            "Source:".bold(),
            env!("CARGO_PKG_REPOSITORY").green()
        ));
        output.push_str(&format!(
            "\n{}",
            "For support or questions, open an issue in the repository.".dimmed()
        ));
        output
    }

    /// Command reference.
    pub fn help() -> String {
        let commands = [
            ("/help, /h, /?", "Show this help"),
            ("/clear", "Delete the whole conversation"),
            ("/history", "Show the conversation again"),
            ("/examples", "List the example questions"),
            ("/ex <n>", "Put example question <n> in the prompt"),
            ("/model", "Show the model in use"),
            ("/about", "About this program"),
            ("/quit, /exit, /q", "Exit"),
        ];

        let mut output = format!("\n{}\n", "Commands:".bold());
        for (command, description) in commands {
            output.push_str(&format!("  {:<18} - {}\n", command.cyan(), description));
        }
        output.push_str(&format!(
            "\n{}\n",
            "Ctrl+C while an answer is streaming stops it.".dimmed()
        ));
        output
    }

    /// The configured model and the known alternatives.
    pub fn models(current: &Model) -> String {
        let mut output = format!("\n{} {}\n\n{}\n", "Model:".bold(), current, "Known models:".bold());
        for model in Model::known_models() {
            let marker = if &model == current { "*" } else { " " };
            output.push_str(&format!("  {} {}\n", marker.green(), model));
        }
        output.push_str(&format!(
            "\n{}\n",
            "Set [api] model in balikci.toml or pass --model to change it.".dimmed()
        ));
        output
    }

    /// One message with its speaker label.
    pub fn message(message: &Message, renderer: &MarkdownRenderer) -> String {
        match message.role {
            Role::User => format!("{}\n{}", Self::user_label(), message.content),
            Role::Assistant => format!(
                "{}\n{}",
                Self::assistant_label(),
                renderer.render(&message.content)
            ),
            Role::System => format!("{}", message.content.dimmed()),
        }
    }

    /// Every message, separated by blank lines.
    pub fn history(messages: &[Message], renderer: &MarkdownRenderer) -> String {
        messages
            .iter()
            .map(|m| Self::message(m, renderer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn user_label() -> String {
        format!("{}", "You ›".cyan().bold())
    }

    pub fn assistant_label() -> String {
        format!("{}", format!("{} ›", APP_NAME).green().bold())
    }

    fn header(title: &str) -> String {
        let line = "─".repeat(WIDTH);
        format!(
            "{}\n{:^width$}\n{}",
            line.cyan(),
            title.bold(),
            line.cyan(),
            width = WIDTH
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::strip_ansi;

    #[test]
    fn test_empty_state_lists_examples() {
        let out = strip_ansi(&ConsoleFormatter::empty_state());
        for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
            assert!(out.contains(&format!("[{}] {}", i + 1, question)));
        }
        assert!(out.contains("/ex <n>"));
    }

    #[test]
    fn test_history_renders_roles_in_order() {
        let messages = vec![
            Message::user("What is `Box`?"),
            Message::assistant("A **heap** pointer."),
        ];
        let out = strip_ansi(&ConsoleFormatter::history(&messages, &MarkdownRenderer::new()));
        assert_eq!(out, "You ›\nWhat is `Box`?\n\nBalıkçı ›\nA heap pointer.");
    }

    #[test]
    fn test_models_marks_current() {
        let out = strip_ansi(&ConsoleFormatter::models(&Model::Gpt41Mini));
        assert!(out.contains("* openai/gpt-4.1-mini"));
        assert!(out.contains("  x-ai/grok-4.1-fast:free"));
    }

    #[test]
    fn test_help_lists_commands() {
        let out = strip_ansi(&ConsoleFormatter::help());
        for command in ["/clear", "/history", "/about", "/ex <n>", "/quit"] {
            assert!(out.contains(command), "missing {}", command);
        }
    }

    #[test]
    fn test_about_shows_version_and_model() {
        let out = strip_ansi(&ConsoleFormatter::about(&Model::default()));
        assert!(out.contains(env!("CARGO_PKG_VERSION")));
        assert!(out.contains("x-ai/grok-4.1-fast:free"));
    }
}
