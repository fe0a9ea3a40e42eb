//! Delete command - remove a record by id

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, log_success};
use crate::output::{format_signed, success};

pub fn run(id: i64, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let tx = match ctx.ledger_service.get(id)? {
        Some(tx) => tx,
        None => anyhow::bail!("Transaction {} not found", id),
    };

    // Confirm deletion unless --force
    if !force && !json {
        println!(
            "\n{}",
            format!(
                "This will delete {} {} on {} (id {}).",
                format_signed(tx.kind, tx.amount),
                tx.category,
                tx.date,
                tx.id
            )
            .yellow()
        );

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.ledger_service.delete(id)?;
    log_success("delete", "transaction_deleted");

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        success(&format!("✓ Transaction {} deleted", id));
    }

    Ok(())
}
