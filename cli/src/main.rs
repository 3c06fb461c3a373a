//! CLI entrypoint for balikci
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use balikci_application::{
    ChatService, ConversationLogger, ConversationStore, KeyValueStore, SendOutcome,
};
use balikci_domain::TypingEffect;
use balikci_infrastructure::{
    ConfigLoader, FileConfig, FileKeyValueStore, JsonlConversationLogger, MemoryKeyValueStore,
    OpenRouterGateway,
};
use balikci_presentation::{ChatRepl, Cli, LiveStreamView, ReplConfig, Viewport};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const HISTORY_FILE_NAME: &str = "history.txt";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_without_files()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;

    apply_cli_overrides(&mut config, &cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", config.redacted().to_toml()?);
        return Ok(());
    }

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("{} {}", "config error:".red().bold(), problem);
        }
        bail!("invalid configuration ({} problems)", problems.len());
    }

    let _log_guard = init_tracing(cli.verbose, config.logging.file_path())?;
    info!("Starting balikci {}", env!("CARGO_PKG_VERSION"));

    // === Dependency Injection ===
    let data_dir = config.storage.resolve_data_dir();
    let store: Arc<dyn KeyValueStore> = if config.storage.persist {
        match FileKeyValueStore::open(&data_dir) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Falling back to in-memory storage: {}", e);
                Arc::new(MemoryKeyValueStore::new())
            }
        }
    } else {
        Arc::new(MemoryKeyValueStore::new())
    };

    let gateway = Arc::new(OpenRouterGateway::new(config.openrouter_config())?);

    let mut service = ChatService::new(
        gateway,
        ConversationStore::new(store),
        config.chat_params(),
    );
    if let Some(path) = config.logging.conversation_log_path()
        && let Some(logger) = JsonlConversationLogger::new(&path)
    {
        info!("Conversation log: {}", path.display());
        service = service.with_conversation_logger(Arc::new(logger) as Arc<dyn ConversationLogger>);
    }
    let service = Arc::new(service);

    // Single question mode
    if let Some(question) = cli.question.as_deref() {
        let mut view = LiveStreamView::new(Viewport::from_terminal(config.chat.follow_tail));
        if cli.quiet {
            view = view.without_spinner();
        }
        return match service.send(question, &view).await {
            SendOutcome::Failed(_) => bail!("the question could not be answered"),
            _ => Ok(()),
        };
    }

    // Chat mode
    let repl_config = ReplConfig {
        show_progress: !cli.quiet,
        history_file: config
            .storage
            .persist
            .then(|| data_dir.join(HISTORY_FILE_NAME)),
        follow_tail: config.chat.follow_tail,
        show_welcome: config.chat.show_welcome,
    };
    ChatRepl::new(service, repl_config).run().await?;

    Ok(())
}

/// Command-line flags win over every configuration source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.api.model = model.trim().to_string();
    }
    if cli.no_stream {
        config.stream.enabled = false;
    }
    if cli.no_typing {
        config.typing = TypingEffect::instant();
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.api.max_tokens = max_tokens;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.display().to_string());
    }
    if cli.no_persist {
        config.storage.persist = false;
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.display().to_string());
    }
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` takes precedence when `-v` is not given. With a log file the
/// output goes there through a non-blocking writer; the returned guard must
/// live until exit so buffered lines are flushed.
fn init_tracing(verbose: u8, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}
