//! Export command - write a JSON backup of every record

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use super::{get_context, log_success};
use crate::output::success;

pub fn run(output: Option<PathBuf>, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let meta = match output {
        Some(path) => ctx.backup_service.export_to_path(&path)?,
        None => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir().context("Could not determine current directory")?,
            };
            ctx.backup_service.export_to(&dir, Local::now().date_naive())?
        }
    };

    log_success("export", "backup_exported");

    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    success(&format!(
        "✓ Exported {} transaction(s) to {} ({})",
        meta.record_count,
        meta.path.display(),
        meta.size_display()
    ));

    Ok(())
}
