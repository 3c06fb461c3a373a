//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::ReplConfig;
use crate::output::console::{ConsoleFormatter, EXAMPLE_QUESTIONS};
use crate::render::{LiveStreamView, MarkdownRenderer, Viewport};
use balikci_application::{ChatService, IgnoreReason, SendOutcome};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tracing::debug;

const PROMPT: &str = "› ";

/// A slash command typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Clear,
    History,
    About,
    Examples,
    /// `/ex <n>`, 1-based.
    Example(usize),
    Model,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`. Returns `None` for ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        Some(match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/history" => ReplCommand::History,
            "/about" => ReplCommand::About,
            "/examples" => ReplCommand::Examples,
            "/ex" => match arg.and_then(|a| a.parse::<usize>().ok()) {
                Some(n) => ReplCommand::Example(n),
                None => ReplCommand::Examples,
            },
            "/model" | "/models" => ReplCommand::Model,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Whether a confirmation answer means yes.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Interactive chat REPL
pub struct ChatRepl {
    service: Arc<ChatService>,
    config: ReplConfig,
    renderer: MarkdownRenderer,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(service: Arc<ChatService>, config: ReplConfig) -> Self {
        Self {
            service,
            config,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        if self.config.show_welcome && !self.service.store().has_seen_welcome() {
            println!("{}", ConsoleFormatter::welcome());
            match rl.readline("") {
                Ok(_) => self.service.store().mark_welcome_seen(),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
                Err(err) => return Err(err),
            }
        }

        println!();
        if self.service.is_empty() {
            println!("{}", ConsoleFormatter::empty_state());
        } else {
            println!(
                "{}",
                ConsoleFormatter::history(&self.service.messages(), &self.renderer)
            );
        }
        println!();

        let mut prefill: Option<String> = None;

        loop {
            let readline = match prefill.take() {
                Some(text) => rl.readline_with_initial(PROMPT, (text.as_str(), "")),
                None => rl.readline(PROMPT),
            };

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command, &mut rl, &mut prefill) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.config.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(
        &self,
        command: ReplCommand,
        rl: &mut DefaultEditor,
        prefill: &mut Option<String>,
    ) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => println!("{}", ConsoleFormatter::help()),
            ReplCommand::Clear => self.confirm_and_clear(rl),
            ReplCommand::History => {
                let messages = self.service.messages();
                if messages.is_empty() {
                    println!("{}", "No messages yet.".dimmed());
                } else {
                    println!("\n{}\n", ConsoleFormatter::history(&messages, &self.renderer));
                }
            }
            ReplCommand::About => {
                println!("\n{}\n", ConsoleFormatter::about(&self.service.params().model));
            }
            ReplCommand::Examples => println!("\n{}\n", ConsoleFormatter::empty_state()),
            ReplCommand::Example(n) => match n.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i)) {
                Some(question) => *prefill = Some(question.to_string()),
                None => println!(
                    "Pick an example between 1 and {} (see /examples)",
                    EXAMPLE_QUESTIONS.len()
                ),
            },
            ReplCommand::Model => {
                println!("{}", ConsoleFormatter::models(&self.service.params().model));
            }
            ReplCommand::Unknown(name) => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn confirm_and_clear(&self, rl: &mut DefaultEditor) {
        let answer = rl
            .readline("The whole conversation will be deleted. Are you sure? [y/N] ")
            .unwrap_or_default();
        if !is_yes(&answer) {
            println!("{}", "Kept the conversation.".dimmed());
            return;
        }

        let removed = self.service.clear();
        debug!("Cleared {} messages", removed);
        println!("{}\n", "Conversation cleared.".green());
        println!("{}\n", ConsoleFormatter::empty_state());
    }

    async fn process_question(&self, question: &str) {
        println!();
        println!("{}", ConsoleFormatter::assistant_label());

        let mut view = LiveStreamView::new(Viewport::from_terminal(self.config.follow_tail));
        if !self.config.show_progress {
            view = view.without_spinner();
        }

        let send = self.service.send(question, &view);
        tokio::pin!(send);

        let outcome = tokio::select! {
            outcome = &mut send => outcome,
            _ = tokio::signal::ctrl_c() => {
                self.service.cancel();
                send.await
            }
        };

        match outcome {
            SendOutcome::Ignored(IgnoreReason::Busy) => {
                println!("{}", "Still answering the previous question.".yellow());
            }
            SendOutcome::Cancelled => debug!("Answer cancelled"),
            _ => {}
        }
        println!();
    }
}
