//! Settings loader — reads `~/.parley/config.json` and applies env-var
//! overrides.
//!
//! # Loading precedence
//! 1. Defaults (from `Settings::default()`)
//! 2. JSON file at `~/.parley/config.json` (or an explicit path)
//! 3. Environment variables `PARLEY_<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::Settings;

/// Default settings file path.
pub fn get_settings_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load settings from the default path (or `path`) plus env vars.
///
/// Falls back to `Settings::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let settings_path = path.map(PathBuf::from).unwrap_or_else(get_settings_path);
    load_settings_from_path(&settings_path)
}

fn load_settings_from_path(path: &Path) -> Settings {
    if !path.exists() {
        info!("No settings file at {}, using defaults", path.display());
        return apply_env_overrides(Settings::default());
    }

    debug!("Loading settings from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read settings file {}: {}", path.display(), e);
            return apply_env_overrides(Settings::default());
        }
    };

    let settings: Settings = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to parse settings JSON: {}", e);
            return apply_env_overrides(Settings::default());
        }
    };

    apply_env_overrides(settings)
}

/// Save settings to disk (pretty-printed JSON with camelCase keys).
pub fn save_settings(settings: &Settings, path: Option<&Path>) -> std::io::Result<()> {
    let settings_path = path.map(PathBuf::from).unwrap_or_else(get_settings_path);

    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(&settings_path, json)?;
    debug!("Settings saved to {}", settings_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of loaded settings.
///
/// Supported overrides:
/// - `PARLEY_PROVIDER` → `provider`
/// - `PARLEY_MODEL` → `model`
/// - `PARLEY_TEMPERATURE` → `temperature`
/// - `PARLEY_MAX_TOKENS` → `max_tokens`
///
/// API keys are resolved separately per provider (`OPENAI_API_KEY` /
/// `ANTHROPIC_API_KEY`) by `Settings::resolved_api_key`.
fn apply_env_overrides(mut settings: Settings) -> Settings {
    if let Ok(val) = std::env::var("PARLEY_PROVIDER") {
        settings.provider = val;
    }
    if let Ok(val) = std::env::var("PARLEY_MODEL") {
        settings.model = Some(val);
    }
    if let Ok(val) = std::env::var("PARLEY_TEMPERATURE") {
        if let Ok(t) = val.parse::<f32>() {
            settings.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            settings.max_tokens = n;
        }
    }
    settings
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
