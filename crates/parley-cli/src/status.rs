//! `parley status` — show settings and credential status.

use anyhow::Result;
use colored::Colorize;

use parley_core::config::{get_settings_path, load_settings};
use parley_core::ProviderKind;

/// Run the status command.
pub fn run() -> Result<()> {
    let settings = load_settings(None);
    let settings_path = get_settings_path();

    println!();
    println!("{}", "Parley Status".cyan().bold());
    println!();

    let exists = settings_path.exists();
    println!(
        "  {:<14} {} {}",
        "Settings:".bold(),
        settings_path.display(),
        if exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!("  {:<14} {}", "Provider:".bold(), settings.provider);

    let model = match settings.provider_kind() {
        Ok(kind) => settings
            .model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string()),
        Err(_) => "—".to_string(),
    };
    println!("  {:<14} {}", "Model:".bold(), model);

    println!(
        "  {:<14} {}",
        "Parameters:".bold(),
        format!(
            "temp: {} | max_tokens: {}",
            settings.temperature, settings.max_tokens
        )
        .dimmed()
    );

    let context = if settings.context.trim().is_empty() {
        "(none)".dimmed().to_string()
    } else {
        parley_core::utils::truncate_string(&settings.context, 60)
    };
    println!("  {:<14} {}", "Context:".bold(), context);

    println!();
    println!("  {}", "Credentials:".bold());
    for kind in [ProviderKind::OpenAi, ProviderKind::Anthropic] {
        let status = if settings.resolved_api_key(kind).is_empty() {
            format!("{} (set {} or the config file)", "· not set".dimmed(), kind.api_key_env())
        } else {
            format!("{} (key set)", "✓".green())
        };
        println!("    {:<12} {}", kind.to_string(), status);
    }
    println!();
    Ok(())
}
