use clap::Subcommand;
use focustimer_core::storage::Database;
use serde_json::json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Focus time since local midnight
    Today,
    /// Focus time since Monday
    Week,
    /// All-time focus totals per category
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let total = db.today_total_seconds(None)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "total_seconds": total,
                    "total_minutes": total / 60,
                }))?
            );
        }
        StatsAction::Week => {
            let total = db.week_total_seconds(None)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "total_seconds": total,
                    "total_minutes": total / 60,
                }))?
            );
        }
        StatsAction::All => {
            let totals = db.category_totals(None, None)?;
            println!("{}", serde_json::to_string_pretty(&totals)?);
        }
    }
    Ok(())
}
