//! Terminal host for the twinchat persona agent.
//!
//! Chats as the portfolio owner. Settings come from `--config`, then
//! `.config/twinchat/config.yaml` in the current directory, then the user
//! config directory. Without any of them the offline `mock` provider is used.
//!
//! # Examples
//!
//! ```sh
//! # Interactive session
//! twinchat
//!
//! # One-shot, machine-readable output
//! twinchat --prompt "What are your skills?" --json
//!
//! # Real model
//! OPENAI_API_KEY=... twinchat --provider openai --model gpt-4o-mini
//!
//! # Keep these flags for next time
//! twinchat --provider ollama --save-config
//! ```

mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use futures::StreamExt;
use twinchat_core::config::ConfigLevel;
use twinchat_core::{
    create_provider, persona_prompt, portfolio_registry, Agent, ConfigProvider,
    FileConfigProvider, Logger, Profile, ProviderModelConfig, Session, Settings, TracingLogger,
    TurnStream,
};

use render::{end_turn, render_chunk, OutputMode};

/// Chat with a portfolio persona from the terminal.
#[derive(Parser, Debug)]
#[command(name = "twinchat", version)]
struct Cli {
    /// Settings file (YAML). Overrides workspace and user settings.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Provider id, e.g. mock, openai, anthropic, ollama.
    #[arg(long, env = "TWINCHAT_PROVIDER")]
    provider: Option<String>,

    /// Model name for the provider.
    #[arg(long, env = "TWINCHAT_MODEL")]
    model: Option<String>,

    /// Profile file (YAML) replacing the built-in persona.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Ask one question and exit.
    #[arg(long, short)]
    prompt: Option<String>,

    /// Print the tool catalog and exit.
    #[arg(long)]
    list_tools: bool,

    /// Print the persona prompt and exit.
    #[arg(long)]
    print_persona: bool,

    /// Emit chunks as JSON lines.
    #[arg(long)]
    json: bool,

    /// Write the effective settings to --config (or the workspace config) and exit.
    #[arg(long)]
    save_config: bool,
}

/// Ctrl-C presses seen by the process
type Interrupts = mpsc::UnboundedReceiver<()>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).await?;
    if let Some(provider) = &cli.provider {
        settings.model.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        settings.model.model = model.clone();
    }
    if let Some(profile) = &cli.profile {
        settings.profile = Some(profile.clone());
    }
    settings.validate().context("invalid settings")?;

    init_tracing(&settings.logging.level);
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());

    let provider = create_provider(&settings.model.provider, logger.clone());
    let provider_default = provider.metadata().default_models.first().map(|m| m.id.clone());
    settings.model.model = settings.model.model_for(provider_default.as_deref());

    if cli.save_config {
        let target = match &cli.config {
            Some(path) => FileConfigProvider::new(path, ConfigLevel::Explicit),
            None => FileConfigProvider::workspace(
                std::env::current_dir().context("failed to read current directory")?,
            ),
        };
        if let Some(backup) = save_settings(&target, &settings).await? {
            println!("Previous settings kept in {}", backup.display());
        }
        println!("Settings written to {}", target.path().display());
        return Ok(());
    }

    let profile = Arc::new(match &settings.profile {
        Some(path) => Profile::from_path(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?,
        None => Profile::builtin().context("built-in profile is invalid")?.clone(),
    });

    let registry = portfolio_registry(profile.clone(), logger.clone())
        .context("failed to register portfolio tools")?;

    if cli.list_tools {
        for tool in registry.list() {
            println!("{:<18} {}", tool.name, tool.description);
        }
        return Ok(());
    }

    let persona = persona_prompt(&profile);
    if cli.print_persona {
        println!("{}", persona.flatten_text());
        return Ok(());
    }

    let mut model = ProviderModelConfig::new(settings.model.model.clone());
    if let Some(key) = settings.model.resolve_api_key() {
        model = model.with_api_key(key);
    }
    if let Some(base) = &settings.model.api_base {
        model = model.with_api_base(base.clone());
    }

    if provider.metadata().requires_api_key && model.api_key.is_none() {
        tracing::warn!(
            "no API key in {}, requests to {} will likely fail",
            settings.model.api_key_env(),
            settings.model.provider
        );
    }

    let agent = Agent::builder(Arc::new(registry), persona, provider)
        .model(model)
        .temperature(settings.model.temperature)
        .max_tokens(settings.model.max_tokens)
        .logger(logger)
        .build();

    let mode = if cli.json {
        OutputMode::JsonLines
    } else {
        OutputMode::Pretty
    };

    let mut interrupts = listen_for_interrupts();
    let mut session = Session::new();
    match cli.prompt {
        Some(prompt) => run_turn(&agent, &mut session, &prompt, &mut interrupts, mode).await,
        None => repl(&agent, &mut session, &profile, &mut interrupts, mode).await,
    }
}

/// Settings from the explicit file, else the workspace file, else the user file
async fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let candidates = match explicit {
        Some(path) => vec![FileConfigProvider::new(path, ConfigLevel::Explicit)],
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            vec![FileConfigProvider::workspace(cwd), FileConfigProvider::user()]
        }
    };

    for provider in candidates {
        if !provider.exists() {
            if provider.level() == ConfigLevel::Explicit {
                anyhow::bail!("config file {} not found", provider.path().display());
            }
            continue;
        }
        return provider.load().await.with_context(|| {
            format!(
                "failed to load {} settings from {}",
                provider.level().as_str(),
                provider.path().display()
            )
        });
    }
    Ok(Settings::default())
}

/// Save `settings` to `target`, copying any existing file aside first
async fn save_settings(target: &FileConfigProvider, settings: &Settings) -> Result<Option<PathBuf>> {
    let backup = target
        .backup()
        .with_context(|| format!("failed to back up {}", target.path().display()))?;
    target
        .save(settings)
        .await
        .with_context(|| format!("failed to write {}", target.path().display()))?;
    Ok(backup)
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("TWINCHAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,twinchat={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Install the process Ctrl-C listener
///
/// Installed once: after the first `ctrl_c()` the default handler no longer
/// terminates the process, so every press has to be routed from here.
fn listen_for_interrupts() -> Interrupts {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Stream one turn to stdout and record it; Ctrl-C cancels it
async fn run_turn(
    agent: &Agent,
    session: &mut Session,
    text: &str,
    interrupts: &mut Interrupts,
    mode: OutputMode,
) -> Result<()> {
    let mut turn = session.ask(agent, text);
    stream_turn(&mut turn, interrupts, &mut io::stdout().lock(), mode).await?;
    session.record(turn.recorder());
    Ok(())
}

async fn stream_turn(
    turn: &mut TurnStream,
    interrupts: &mut Interrupts,
    out: &mut impl Write,
    mode: OutputMode,
) -> Result<()> {
    let mut last = None;
    loop {
        tokio::select! {
            chunk = turn.next() => match chunk {
                Some(chunk) => {
                    render_chunk(out, &chunk, mode)?;
                    last = Some(chunk);
                }
                None => break,
            },
            Some(()) = interrupts.recv() => turn.cancel(),
        }
    }

    if turn.is_cancelled() && mode == OutputMode::Pretty {
        writeln!(out, " [stopped]")?;
    }
    end_turn(out, last.as_ref(), mode)?;
    Ok(())
}

/// Read questions until `/quit`, end of input, or Ctrl-C at the prompt
async fn repl(
    agent: &Agent,
    session: &mut Session,
    profile: &Profile,
    interrupts: &mut Interrupts,
    mode: OutputMode,
) -> Result<()> {
    println!(
        "Chatting with {} ({}). /reset clears the conversation, /quit exits.",
        profile.identity.name,
        agent.provider_name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            Some(()) = interrupts.recv() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.clear();
                println!("Conversation cleared.");
            }
            "/history" => {
                for msg in session.history() {
                    println!("{:?}: {}", msg.role, msg.flatten_text());
                }
            }
            _ => run_turn(agent, session, line, interrupts, mode).await?,
        }
    }
    Ok(())
}
