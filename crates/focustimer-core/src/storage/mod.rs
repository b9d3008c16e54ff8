mod config;
pub mod database;
mod models;

pub use config::{Config, Preset};
pub use database::{CategoryTotal, Database, SessionFilter};
pub use models::{Category, SessionRecord, SessionStatus, Settings};

use std::path::PathBuf;

use crate::error::DatabaseError;

/// The persistence seam the timer engine calls into.
///
/// The engine persists each record exactly once and re-reads settings at
/// every completion decision; both calls are synchronous and expected to
/// be fast.
pub trait SessionStore {
    /// Persist a record, returning its assigned id.
    fn create_session(&self, record: &SessionRecord) -> Result<i64, DatabaseError>;

    /// Current settings, read fresh (never cached by the engine).
    fn settings(&self) -> Result<Settings, DatabaseError>;
}

/// Returns `~/.config/focustimer[-dev]/` based on FOCUSTIMER_ENV.
///
/// Set FOCUSTIMER_ENV=dev to use the development data directory, or
/// FOCUSTIMER_DATA_DIR to point somewhere else entirely (tests do).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(dir) = std::env::var("FOCUSTIMER_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("FOCUSTIMER_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("focustimer-dev")
        } else {
            base_dir.join("focustimer")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
