//! Settings — schema + loader.
//!
//! JSON file at `~/.parley/config.json`, env-var overrides on top.

pub mod loader;
pub mod schema;

pub use loader::{get_settings_path, load_settings, save_settings};
pub use schema::Settings;
