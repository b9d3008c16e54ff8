//! Helpers shared by the command modules.

use focustimer_core::storage::Database;

/// Resolve a category name to its id, failing on unknown names.
pub fn resolve_category(db: &Database, name: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let category = db
        .find_category(name)?
        .ok_or_else(|| format!("unknown category '{name}'"))?;
    category
        .id
        .ok_or_else(|| format!("category '{name}' has no id").into())
}

/// Parse a settings value the way shells write booleans.
pub fn parse_bool(value: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'").into()),
    }
}

/// Unix timestamp `days` back from now.
pub fn days_ago_ts(days: u32) -> i64 {
    chrono::Utc::now().timestamp() - i64::from(days) * 86_400
}
