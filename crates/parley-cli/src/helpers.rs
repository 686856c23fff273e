//! Shared CLI helpers — path expansion and console output.

use std::path::PathBuf;

use colored::Colorize;

use parley_core::GenerationConfig;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown at REPL start.
pub fn print_banner(config: &GenerationConfig) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Parley".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!(
            "{} / {} · temp {} · max {} tokens",
            config.provider,
            config.model(),
            config.temperature,
            config.max_tokens
        )
        .dimmed()
    );
    println!(
        "{}",
        "Ask your questions. /clear, /export, /context, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print the speaker label before a streamed reply.
pub fn print_reply_prefix() {
    println!();
    println!("{}", "Interviewee".cyan().bold());
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
