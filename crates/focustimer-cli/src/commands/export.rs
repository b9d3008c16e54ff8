use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use focustimer_core::storage::{Database, SessionFilter};

use super::common::{days_ago_ts, resolve_category};

#[derive(Args)]
pub struct ExportArgs {
    /// Output CSV file
    #[arg(long, short)]
    pub out: PathBuf,
    /// Filter by category name
    #[arg(long)]
    pub category: Option<String>,
    /// Only sessions from the last N days
    #[arg(long)]
    pub days: Option<u32>,
    /// Include break sessions
    #[arg(long)]
    pub breaks: bool,
    /// Maximum number of rows
    #[arg(long, default_value = "10000")]
    pub limit: u32,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let filter = SessionFilter {
        category_id: match &args.category {
            Some(name) => Some(resolve_category(&db, name)?),
            None => None,
        },
        since_ts: args.days.map(days_ago_ts),
        until_ts: None,
        include_breaks: args.breaks,
        limit: Some(args.limit),
    };

    let mut out = BufWriter::new(File::create(&args.out)?);
    let count = db.export_csv(&mut out, &filter)?;
    println!("exported {count} sessions to {}", args.out.display());
    Ok(())
}
