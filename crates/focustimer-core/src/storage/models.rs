//! Value objects owned by the persistence layer.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Completion status of a recorded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Interrupted,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Interrupted => "interrupted",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "completed" => Ok(SessionStatus::Completed),
            "interrupted" => Ok(SessionStatus::Interrupted),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown session status '{other}'"),
            }),
        }
    }
}

/// Immutable summary of one completed or interrupted focus/break
/// interval. Built by the timer engine at phase completion or
/// interruption, persisted immediately, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Database id, assigned on insert.
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    /// Unix timestamp when the phase started.
    pub start_ts: i64,
    /// Unix timestamp when the record was created.
    pub end_ts: i64,
    /// Originally planned duration.
    pub planned_seconds: i64,
    /// Actual time spent, clamped to `[0, planned_seconds]`.
    pub actual_seconds: i64,
    pub status: SessionStatus,
    pub note: Option<String>,
    pub is_break: bool,
    pub created_at: i64,
}

impl SessionRecord {
    /// Actual duration in minutes.
    pub fn duration_minutes(&self) -> f64 {
        self.actual_seconds as f64 / 60.0
    }

    /// Percentage of the planned time completed.
    pub fn completion_pct(&self) -> f64 {
        if self.planned_seconds == 0 {
            return 0.0;
        }
        (self.actual_seconds as f64 / self.planned_seconds as f64 * 100.0).min(100.0)
    }
}

/// A category for organizing focus sessions (Study, Work, Coding, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub default_focus_minutes: u32,
    pub default_break_minutes: u32,
    pub color: String,
    pub created_at: i64,
}

impl Category {
    pub fn new(name: &str, default_focus_minutes: u32, default_break_minutes: u32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            default_focus_minutes: default_focus_minutes.max(1),
            default_break_minutes: default_break_minutes.max(1),
            color: "#4CAF50".into(),
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Application settings, stored as key/value rows in the database.
///
/// The engine reads these fresh at every completion decision; they are
/// never cached inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub auto_start_break: bool,
    pub auto_start_focus: bool,
    pub keep_screen_awake: bool,
    pub sound_enabled: bool,
    pub notification_enabled: bool,
    pub log_breaks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_start_break: true,
            auto_start_focus: false,
            keep_screen_awake: true,
            sound_enabled: true,
            notification_enabled: true,
            log_breaks: false,
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 6] = [
        "auto_start_break",
        "auto_start_focus",
        "keep_screen_awake",
        "sound_enabled",
        "notification_enabled",
        "log_breaks",
    ];

    pub fn get(&self, key: &str) -> Result<bool, ValidationError> {
        match key {
            "auto_start_break" => Ok(self.auto_start_break),
            "auto_start_focus" => Ok(self.auto_start_focus),
            "keep_screen_awake" => Ok(self.keep_screen_awake),
            "sound_enabled" => Ok(self.sound_enabled),
            "notification_enabled" => Ok(self.notification_enabled),
            "log_breaks" => Ok(self.log_breaks),
            other => Err(ValidationError::UnknownKey(other.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: bool) -> Result<(), ValidationError> {
        match key {
            "auto_start_break" => self.auto_start_break = value,
            "auto_start_focus" => self.auto_start_focus = value,
            "keep_screen_awake" => self.keep_screen_awake = value,
            "sound_enabled" => self.sound_enabled = value,
            "notification_enabled" => self.notification_enabled = value,
            "log_breaks" => self.log_breaks = value,
            other => return Err(ValidationError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
