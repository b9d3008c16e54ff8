use clap::Subcommand;
use focustimer_core::storage::{Database, SessionFilter};

use super::common::{days_ago_ts, resolve_category};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recorded sessions as JSON, newest first
    List {
        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
        /// Only sessions from the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Include break sessions
        #[arg(long)]
        breaks: bool,
        /// Maximum number of results
        #[arg(long, default_value = "100")]
        limit: u32,
    },
    /// Attach a note to a session
    Note {
        /// Session id (from `sessions list`)
        id: i64,
        note: String,
    },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SessionsAction::List {
            category,
            days,
            breaks,
            limit,
        } => {
            let filter = SessionFilter {
                category_id: match &category {
                    Some(name) => Some(resolve_category(&db, name)?),
                    None => None,
                },
                since_ts: days.map(days_ago_ts),
                until_ts: None,
                include_breaks: breaks,
                limit: Some(limit),
            };
            let records = db.list_sessions(&filter)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        SessionsAction::Note { id, note } => {
            if db.update_session_note(id, &note)? {
                println!("note saved");
            } else {
                return Err(format!("no session with id {id}").into());
            }
        }
    }
    Ok(())
}
