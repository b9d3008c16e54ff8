use clap::Subcommand;
use focustimer_core::storage::{Category, Database};

use super::common::resolve_category;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add {
        name: String,
        /// Default focus duration in minutes
        #[arg(long, default_value = "25")]
        focus: u32,
        /// Default break duration in minutes
        #[arg(long = "break", default_value = "5")]
        break_minutes: u32,
        /// Display color (hex)
        #[arg(long)]
        color: Option<String>,
    },
    /// List categories as JSON
    List,
    /// Delete a category and its recorded sessions
    Rm { name: String },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        CategoryAction::Add {
            name,
            focus,
            break_minutes,
            color,
        } => {
            let mut category = Category::new(&name, focus, break_minutes);
            if let Some(color) = color {
                category.color = color;
            }
            let id = db.create_category(&category)?;
            category.id = Some(id);
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::List => {
            let categories = db.list_categories()?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Rm { name } => {
            let id = resolve_category(&db, &name)?;
            db.delete_category(id)?;
            println!("deleted category '{name}'");
        }
    }
    Ok(())
}
