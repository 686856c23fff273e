//! Parley CLI — entry point.
//!
//! # Commands
//!
//! - `parley chat [-m MESSAGE]` — interview chat (single-shot or REPL)
//! - `parley onboard` — initialize the settings file
//! - `parley status` — show settings and credential status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;

use parley_chat::Orchestrator;
use parley_core::config::{load_settings, Settings};
use parley_core::{Conversation, GenerationConfig, PersonaInstruction};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley — role-played interview chat over streaming LLM providers
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the interviewee persona (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Provider: "openai" or "anthropic"
        #[arg(short, long)]
        provider: Option<String>,

        /// Model override (defaults to the provider's model)
        #[arg(long)]
        model: Option<String>,

        /// API key (falls back to config file, then OPENAI_API_KEY /
        /// ANTHROPIC_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Sampling temperature in [0.0, 1.0]
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Maximum tokens per reply
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Interviewee background for the persona
        #[arg(short, long)]
        context: Option<String>,

        /// Settings file path (default: ~/.parley/config.json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize the settings file
    Onboard,

    /// Show settings and credential status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            provider,
            model,
            api_key,
            temperature,
            max_tokens,
            context,
            config,
            logs,
        } => {
            init_logging(logs);
            let settings = resolve_settings(
                config.as_deref(),
                provider,
                model,
                api_key,
                temperature,
                max_tokens,
                context,
            );
            run_chat(message, settings).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

/// Load settings from disk and apply CLI flag overrides.
fn resolve_settings(
    config_path: Option<&std::path::Path>,
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    context: Option<String>,
) -> Settings {
    let mut settings = load_settings(config_path);
    if let Some(provider) = provider {
        settings.provider = provider;
    }
    if let Some(model) = model {
        settings.model = Some(model);
    }
    if let Some(api_key) = api_key {
        settings.api_key = api_key;
    }
    if let Some(temperature) = temperature {
        settings.temperature = temperature;
    }
    if let Some(max_tokens) = max_tokens {
        settings.max_tokens = max_tokens;
    }
    if let Some(context) = context {
        settings.context = context;
    }
    settings
}

async fn run_chat(message: Option<String>, settings: Settings) -> Result<()> {
    let config = settings
        .generation_config()
        .context("invalid generation settings")?;
    let persona = PersonaInstruction::with_context(settings.context.clone());
    let orchestrator = Orchestrator::new();

    match message {
        Some(text) => {
            // Single-shot mode
            info!(provider = %config.provider, "processing single message");
            let mut conversation = Conversation::new();
            stream_turn(&orchestrator, &text, &config, &persona, &mut conversation).await
        }
        None => repl::run(orchestrator, config, persona).await,
    }
}

/// Submit one turn and print fragments as they arrive.
pub async fn stream_turn(
    orchestrator: &Orchestrator,
    text: &str,
    config: &GenerationConfig,
    persona: &PersonaInstruction,
    conversation: &mut Conversation,
) -> Result<()> {
    let mut stream = orchestrator
        .submit(text, config, persona, conversation)
        .await?;

    helpers::print_reply_prefix();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        print!("{fragment}");
        std::io::stdout().flush()?;
    }
    println!();
    println!();
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parley=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
