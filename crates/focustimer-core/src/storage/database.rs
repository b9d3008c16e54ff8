//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Focus/break session records and per-category statistics
//! - Session categories with per-category timer defaults
//! - Application settings (auto-continue policy, break logging)
//! - Key-value store for host state (the CLI parks the timer context here)

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use super::models::{Category, SessionRecord, SessionStatus, Settings};
use super::{data_dir, SessionStore};
use crate::error::{CoreError, DatabaseError};

/// Filters for session queries.
#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub category_id: Option<i64>,
    /// Only sessions starting at or after this unix timestamp.
    pub since_ts: Option<i64>,
    /// Only sessions starting at or before this unix timestamp.
    pub until_ts: Option<i64>,
    pub include_breaks: bool,
    pub limit: Option<u32>,
}

/// Focus totals for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total_seconds: i64,
    pub session_count: i64,
}

/// SQLite database for categories, sessions, and settings.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `data_dir()/focustimer.db`.
    ///
    /// Creates the file, schema, and default categories if missing.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?
            .join("focustimer.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS categories (
                    id                INTEGER PRIMARY KEY AUTOINCREMENT,
                    name              TEXT UNIQUE NOT NULL,
                    default_focus_min INTEGER NOT NULL DEFAULT 25,
                    default_break_min INTEGER NOT NULL DEFAULT 5,
                    color             TEXT NOT NULL DEFAULT '#4CAF50',
                    created_at        INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    category_id INTEGER,
                    start_ts    INTEGER NOT NULL,
                    end_ts      INTEGER NOT NULL,
                    planned_sec INTEGER NOT NULL,
                    actual_sec  INTEGER NOT NULL,
                    status      TEXT NOT NULL,
                    note        TEXT,
                    is_break    INTEGER NOT NULL DEFAULT 0,
                    created_at  INTEGER NOT NULL,
                    FOREIGN KEY (category_id) REFERENCES categories(id)
                );

                CREATE TABLE IF NOT EXISTS settings (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_category ON sessions(category_id);
                CREATE INDEX IF NOT EXISTS idx_sessions_start ON sessions(start_ts);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        self.seed_default_categories()
    }

    fn seed_default_categories(&self) -> Result<(), DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp();
        let defaults = [
            ("Study", 25u32, 5u32, "#4CAF50"),
            ("Work", 50, 10, "#2196F3"),
            ("Coding", 45, 10, "#9C27B0"),
            ("Reading", 30, 5, "#FF9800"),
        ];
        for (name, focus, brk, color) in defaults {
            self.conn.execute(
                "INSERT INTO categories (name, default_focus_min, default_break_min, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, focus, brk, color, now],
            )?;
        }
        Ok(())
    }

    // ── Categories ───────────────────────────────────────────────────

    pub fn create_category(&self, category: &Category) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO categories (name, default_focus_min, default_break_min, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.name,
                category.default_focus_minutes,
                category.default_break_minutes,
                category.color,
                category.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>, DatabaseError> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, default_focus_min, default_break_min, color, created_at
                 FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn find_category(&self, name: &str) -> Result<Option<Category>, DatabaseError> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, default_focus_min, default_break_min, color, created_at
                 FROM categories WHERE name = ?1",
                params![name],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, default_focus_min, default_break_min, color, created_at
             FROM categories ORDER BY name",
        )?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn update_category(&self, category: &Category) -> Result<bool, DatabaseError> {
        let Some(id) = category.id else {
            return Ok(false);
        };
        let changed = self.conn.execute(
            "UPDATE categories
             SET name = ?1, default_focus_min = ?2, default_break_min = ?3, color = ?4
             WHERE id = ?5",
            params![
                category.name,
                category.default_focus_minutes,
                category.default_break_minutes,
                category.color,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a category and all sessions recorded against it.
    pub fn delete_category(&self, id: i64) -> Result<bool, DatabaseError> {
        self.conn
            .execute("DELETE FROM sessions WHERE category_id = ?1", params![id])?;
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub fn create_session(&self, record: &SessionRecord) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions
             (category_id, start_ts, end_ts, planned_sec, actual_sec, status, note, is_break, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.category_id,
                record.start_ts,
                record.end_ts,
                record.planned_seconds,
                record.actual_seconds,
                record.status.as_str(),
                record.note,
                record.is_break as i64,
                record.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_session(&self, id: i64) -> Result<Option<SessionRecord>, DatabaseError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, category_id, start_ts, end_ts, planned_sec, actual_sec, status, note, is_break, created_at
                 FROM sessions WHERE id = ?1",
                params![id],
                row_to_session,
            )
            .optional()?;
        Ok(record)
    }

    pub fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut sql = String::from(
            "SELECT id, category_id, start_ts, end_ts, planned_sec, actual_sec, status, note, is_break, created_at
             FROM sessions WHERE 1=1",
        );
        let mut args: Vec<i64> = Vec::new();

        if !filter.include_breaks {
            sql.push_str(" AND is_break = 0");
        }
        if let Some(category_id) = filter.category_id {
            args.push(category_id);
            sql.push_str(&format!(" AND category_id = ?{}", args.len()));
        }
        if let Some(since) = filter.since_ts {
            args.push(since);
            sql.push_str(&format!(" AND start_ts >= ?{}", args.len()));
        }
        if let Some(until) = filter.until_ts {
            args.push(until);
            sql.push_str(&format!(" AND start_ts <= ?{}", args.len()));
        }
        args.push(i64::from(filter.limit.unwrap_or(100)));
        sql.push_str(&format!(" ORDER BY start_ts DESC LIMIT ?{}", args.len()));

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args), row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn update_session_note(&self, id: i64, note: &str) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET note = ?1 WHERE id = ?2",
            params![note, id],
        )?;
        Ok(changed > 0)
    }

    // ── Statistics ───────────────────────────────────────────────────

    /// Total focused seconds since local midnight.
    pub fn today_total_seconds(&self, category_id: Option<i64>) -> Result<i64, DatabaseError> {
        let since = start_of_day_ts(Local::now().date_naive());
        self.total_seconds_since(since, category_id)
    }

    /// Total focused seconds since Monday local midnight.
    pub fn week_total_seconds(&self, category_id: Option<i64>) -> Result<i64, DatabaseError> {
        let today = Local::now().date_naive();
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        self.total_seconds_since(start_of_day_ts(monday), category_id)
    }

    /// Total focused (non-break) seconds since a unix timestamp.
    pub fn total_seconds_since(
        &self,
        since_ts: i64,
        category_id: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let total = match category_id {
            Some(id) => self.conn.query_row(
                "SELECT COALESCE(SUM(actual_sec), 0) FROM sessions
                 WHERE start_ts >= ?1 AND is_break = 0 AND category_id = ?2",
                params![since_ts, id],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COALESCE(SUM(actual_sec), 0) FROM sessions
                 WHERE start_ts >= ?1 AND is_break = 0",
                params![since_ts],
                |row| row.get(0),
            )?,
        };
        Ok(total)
    }

    /// Focus totals per category, descending, optionally windowed by
    /// start timestamp.
    pub fn category_totals(
        &self,
        since_ts: Option<i64>,
        until_ts: Option<i64>,
    ) -> Result<Vec<CategoryTotal>, DatabaseError> {
        let mut sql = String::from(
            "SELECT c.id, c.name, c.default_focus_min, c.default_break_min, c.color, c.created_at,
                    COALESCE(SUM(s.actual_sec), 0) AS total_seconds,
                    COUNT(s.id) AS session_count
             FROM categories c
             LEFT JOIN sessions s ON c.id = s.category_id AND s.is_break = 0",
        );
        let mut args: Vec<i64> = Vec::new();
        if let Some(since) = since_ts {
            args.push(since);
            sql.push_str(&format!(" AND s.start_ts >= ?{}", args.len()));
        }
        if let Some(until) = until_ts {
            args.push(until);
            sql.push_str(&format!(" AND s.start_ts <= ?{}", args.len()));
        }
        sql.push_str(" GROUP BY c.id ORDER BY total_seconds DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let totals = stmt
            .query_map(params_from_iter(args), |row| {
                Ok(CategoryTotal {
                    category: row_to_category(row)?,
                    total_seconds: row.get(6)?,
                    session_count: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn get_settings(&self) -> Result<Settings, DatabaseError> {
        let mut settings = Settings::default();
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            // Unknown keys are ignored for forward compatibility.
            let _ = settings.set(&key, value == "true");
        }
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        for key in Settings::KEYS {
            let value = settings.get(key).unwrap_or_default();
            self.conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, if value { "true" } else { "false" }],
            )?;
        }
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Export matching sessions as CSV, returning the number of rows
    /// written (excluding the header).
    pub fn export_csv<W: Write>(&self, out: &mut W, filter: &SessionFilter) -> Result<usize, CoreError> {
        let records = self.list_sessions(filter)?;
        writeln!(
            out,
            "ID,Category,Start Time,End Time,Planned (min),Actual (min),Status,Note,Is Break"
        )?;
        let mut count = 0;
        // list_sessions returns newest first; exports read better oldest first.
        for record in records.iter().rev() {
            let category = match record.category_id {
                Some(id) => self
                    .get_category(id)?
                    .map(|c| c.name)
                    .unwrap_or_default(),
                None => String::new(),
            };
            writeln!(
                out,
                "{},{},{},{},{:.1},{:.1},{},{},{}",
                record.id.unwrap_or_default(),
                csv_field(&category),
                fmt_local_ts(record.start_ts),
                fmt_local_ts(record.end_ts),
                record.planned_seconds as f64 / 60.0,
                record.actual_seconds as f64 / 60.0,
                record.status.as_str(),
                csv_field(record.note.as_deref().unwrap_or("")),
                if record.is_break { "Yes" } else { "No" },
            )?;
            count += 1;
        }
        Ok(count)
    }
}

impl SessionStore for Database {
    fn create_session(&self, record: &SessionRecord) -> Result<i64, DatabaseError> {
        Database::create_session(self, record)
    }

    fn settings(&self) -> Result<Settings, DatabaseError> {
        self.get_settings()
    }
}

fn row_to_category(row: &rusqlite::Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        default_focus_minutes: row.get(2)?,
        default_break_minutes: row.get(3)?,
        color: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<SessionRecord, rusqlite::Error> {
    let status: String = row.get(6)?;
    Ok(SessionRecord {
        id: Some(row.get(0)?),
        category_id: row.get(1)?,
        start_ts: row.get(2)?,
        end_ts: row.get(3)?,
        planned_seconds: row.get(4)?,
        actual_seconds: row.get(5)?,
        status: SessionStatus::parse(&status).unwrap_or(SessionStatus::Interrupted),
        note: row.get(7)?,
        is_break: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    })
}

fn start_of_day_ts(date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    match naive.and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) => dt.timestamp(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.timestamp(),
        chrono::LocalResult::None => naive.and_utc().timestamp(),
    }
}

fn fmt_local_ts(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        chrono::LocalResult::None => ts.to_string(),
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(is_break: bool, actual: i64) -> SessionRecord {
        SessionRecord {
            id: None,
            category_id: None,
            start_ts: 1_000,
            end_ts: 1_000 + actual,
            planned_seconds: 1_500,
            actual_seconds: actual,
            status: SessionStatus::Completed,
            note: None,
            is_break,
            created_at: 1_000 + actual,
        }
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let id = db.create_session(&sample_record(false, 600)).unwrap();
        let fetched = db.get_session(id).unwrap().unwrap();
        assert_eq!(fetched.actual_seconds, 600);
        assert_eq!(fetched.status, SessionStatus::Completed);
        assert!(!fetched.is_break);
    }

    #[test]
    fn list_excludes_breaks_by_default() {
        let db = Database::open_memory().unwrap();
        db.create_session(&sample_record(false, 600)).unwrap();
        db.create_session(&sample_record(true, 300)).unwrap();

        let focus_only = db.list_sessions(&SessionFilter::default()).unwrap();
        assert_eq!(focus_only.len(), 1);

        let all = db
            .list_sessions(&SessionFilter {
                include_breaks: true,
                ..SessionFilter::default()
            })
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn totals_ignore_breaks() {
        let db = Database::open_memory().unwrap();
        db.create_session(&sample_record(false, 600)).unwrap();
        db.create_session(&sample_record(true, 300)).unwrap();
        assert_eq!(db.total_seconds_since(0, None).unwrap(), 600);
    }

    #[test]
    fn default_categories_seeded_once() {
        let db = Database::open_memory().unwrap();
        let categories = db.list_categories().unwrap();
        assert_eq!(categories.len(), 4);
        assert!(categories.iter().any(|c| c.name == "Study"));
    }

    #[test]
    fn category_crud() {
        let db = Database::open_memory().unwrap();
        let mut category = Category::new("Writing", 40, 8);
        let id = db.create_category(&category).unwrap();
        category.id = Some(id);
        category.color = "#123456".into();
        assert!(db.update_category(&category).unwrap());
        assert_eq!(db.get_category(id).unwrap().unwrap().color, "#123456");
        assert!(db.delete_category(id).unwrap());
        assert!(db.get_category(id).unwrap().is_none());
    }

    #[test]
    fn delete_category_removes_its_sessions() {
        let db = Database::open_memory().unwrap();
        let id = db.create_category(&Category::new("Temp", 25, 5)).unwrap();
        let mut record = sample_record(false, 600);
        record.category_id = Some(id);
        db.create_session(&record).unwrap();
        db.delete_category(id).unwrap();
        assert!(db.list_sessions(&SessionFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn settings_round_trip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.get_settings().unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.log_breaks = true;
        settings.auto_start_break = false;
        db.save_settings(&settings).unwrap();
        assert_eq!(db.get_settings().unwrap(), settings);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn export_writes_header_and_rows() {
        let db = Database::open_memory().unwrap();
        db.create_session(&sample_record(false, 600)).unwrap();
        let mut buf = Vec::new();
        let count = db.export_csv(&mut buf, &SessionFilter::default()).unwrap();
        assert_eq!(count, 1);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("ID,Category,Start Time"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
