use clap::Subcommand;
use focustimer_core::storage::{Config, Database};
use serde_json::json;

use super::common::parse_bool;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print current settings and timer presets
    Show,
    /// Change a boolean setting (auto_start_break, auto_start_focus,
    /// keep_screen_awake, sound_enabled, notification_enabled,
    /// log_breaks)
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ConfigAction::Show => {
            let settings = db.get_settings()?;
            let config = Config::load()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "settings": settings,
                    "tick_interval_ms": config.tick_interval_ms,
                    "presets": config.presets,
                }))?
            );
        }
        ConfigAction::Set { key, value } => {
            let mut settings = db.get_settings()?;
            settings.set(&key, parse_bool(&value)?)?;
            db.save_settings(&settings)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
