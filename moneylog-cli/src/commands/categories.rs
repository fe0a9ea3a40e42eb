//! Categories command - show and edit the category vocabulary

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{get_context, get_data_dir, log_success};
use crate::output::{success, warning};

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category to the vocabulary
    Add {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a category (existing records keep it)
    Remove {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Option<CategoriesCommands>, json: bool) -> Result<()> {
    match command {
        None => list(json),
        Some(CategoriesCommands::Add { name, json }) => {
            let mut ctx = get_context()?;
            let added = ctx.config.add_category(&name)?;
            if added {
                ctx.config.save(&get_data_dir()?)?;
                log_success("categories", "category_added");
            }

            if json {
                let output = json!({ "category": name.trim(), "added": added });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if added {
                success(&format!("✓ Added category '{}'", name.trim()));
            } else {
                warning(&format!("Category '{}' already exists", name.trim()));
            }
            Ok(())
        }
        Some(CategoriesCommands::Remove { name, json }) => {
            let mut ctx = get_context()?;
            ctx.config.remove_category(&name)?;
            ctx.config.save(&get_data_dir()?)?;
            log_success("categories", "category_removed");

            if json {
                let output = json!({ "category": name.trim(), "removed": true });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                success(&format!("✓ Removed category '{}'", name.trim()));
            }
            Ok(())
        }
    }
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.config.categories)?);
        return Ok(());
    }

    println!("{}", "Categories".bold());
    for category in &ctx.config.categories {
        println!("  • {}", category);
    }

    Ok(())
}
