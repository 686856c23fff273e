//! Interactive REPL — rustyline loop with streaming output.
//!
//! Slash commands mirror the settings surface: `/clear` resets the
//! conversation, `/export [PATH]` writes the transcript, `/context TEXT`
//! swaps the interviewee background mid-conversation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use parley_chat::Orchestrator;
use parley_core::{Conversation, GenerationConfig, PersonaInstruction};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Default transcript export file.
const EXPORT_FILE: &str = "interview_chat.txt";

/// Run the interactive REPL loop.
pub async fn run(
    orchestrator: Orchestrator,
    config: GenerationConfig,
    mut persona: PersonaInstruction,
) -> Result<()> {
    helpers::print_banner(&config);

    let mut editor = create_editor()?;
    let mut conversation = Conversation::new();

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if let Some(rest) = trimmed.strip_prefix('/') {
            handle_command(rest, &mut conversation, &mut persona);
            continue;
        }

        debug!(input = trimmed, "submitting turn");
        if let Err(e) = crate::stream_turn(
            &orchestrator,
            trimmed,
            &config,
            &persona,
            &mut conversation,
        )
        .await
        {
            eprintln!("\n{} {e}\n", "Error:".red().bold());
        }
    }

    save_history(&mut editor);
    Ok(())
}

/// Dispatch a slash command (everything after the `/`).
fn handle_command(command: &str, conversation: &mut Conversation, persona: &mut PersonaInstruction) {
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "clear" => {
            conversation.clear();
            println!("{}", "Conversation cleared.".dimmed());
        }
        "export" => {
            let path = if rest.is_empty() {
                PathBuf::from(EXPORT_FILE)
            } else {
                helpers::expand_tilde(rest)
            };
            match std::fs::write(&path, conversation.transcript()) {
                Ok(()) => println!("{} {}", "Exported to".dimmed(), path.display()),
                Err(e) => eprintln!("{} {e}", "Export failed:".red().bold()),
            }
        }
        "context" => {
            persona.context = rest.to_string();
            if persona.has_context() {
                println!("{}", "Context updated for the next turn.".dimmed());
            } else {
                println!("{}", "Context cleared.".dimmed());
            }
        }
        other => {
            eprintln!("Unknown command: /{other} (try /clear, /export, /context)");
        }
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> PathBuf {
    parley_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
