//! `parley onboard` — initialize the settings file.

use anyhow::Result;
use colored::Colorize;

use parley_core::config::{get_settings_path, save_settings, Settings};
use parley_core::utils::get_data_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Parley — Setup".cyan().bold());
    println!();

    let settings_path = get_settings_path();

    if settings_path.exists() {
        println!(
            "  {} settings already exist at {}",
            "✓".green(),
            settings_path.display()
        );
    } else {
        save_settings(&Settings::default(), Some(&settings_path))?;
        println!(
            "  {} created settings at {}",
            "✓".green(),
            settings_path.display()
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)?;

    println!();
    println!(
        "  Set an API key in {} (or export OPENAI_API_KEY / ANTHROPIC_API_KEY),",
        settings_path.display()
    );
    println!("  then run {} to start the interview.", "parley chat".bold());
    println!();
    Ok(())
}
