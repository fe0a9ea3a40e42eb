//! Import command - append records from a JSON backup

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Confirm;

use moneylog_core::domain::backup::import_document;

use super::{get_context, log_success};
use crate::output::{success, warning, warning_stderr};

/// How an import gets the go-ahead
#[derive(Debug, PartialEq, Eq)]
enum Approval {
    Forced,
    Prompt,
    /// No terminal to ask on and no `--force`
    Refused,
}

/// Stdin carries the document and `--json` output is for scripts, so
/// neither can answer a prompt
fn approval(force: bool, json: bool, from_file: bool) -> Approval {
    if force {
        Approval::Forced
    } else if json || !from_file {
        Approval::Refused
    } else {
        Approval::Prompt
    }
}

fn duplicate_warning(existing: usize) -> Option<String> {
    (existing > 0).then(|| {
        format!(
            "The ledger already holds {} transaction(s). Importing does not skip duplicates.",
            existing
        )
    })
}

pub fn run(file: Option<PathBuf>, force: bool, json: bool) -> Result<()> {
    // Get the document from: argument or stdin
    let document = if let Some(path) = &file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read backup file: {}", path.display()))?
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read backup from stdin")?;
        buffer
    } else {
        bail!("No backup provided. Pass a file path or pipe a backup into stdin.");
    };

    // Decode fully before touching the store
    let records = import_document(&document)?;

    let ctx = get_context()?;
    let existing = ctx.ledger_service.snapshot().records.len();

    match approval(force, json, file.is_some()) {
        Approval::Prompt => {
            println!();
            println!("Backup contains {} transaction(s).", records.len());
            if let Some(message) = duplicate_warning(existing) {
                warning(&message);
            }
            if !Confirm::new()
                .with_prompt("Import these transactions?")
                .default(false)
                .interact()?
            {
                println!("{}\n", "Cancelled".dimmed());
                return Ok(());
            }
        }
        Approval::Forced => {
            if let Some(message) = duplicate_warning(existing) {
                if json || file.is_none() {
                    warning_stderr(&message);
                } else {
                    warning(&message);
                }
            }
        }
        Approval::Refused => {
            if let Some(message) = duplicate_warning(existing) {
                warning_stderr(&message);
            }
            bail!(
                "Not importing {} transaction(s) without confirmation. Re-run with --force.",
                records.len()
            );
        }
    }

    let result = ctx.backup_service.import_records(records)?;
    if result.imported > 0 {
        log_success("import", "backup_imported");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        success(&format!(
            "✓ Imported {} of {} transaction(s)",
            result.imported, result.total
        ));
    }

    if let Some(error) = result.error {
        bail!("Import stopped early: {}", error);
    }

    Ok(())
}
