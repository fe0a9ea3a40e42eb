//! Money Log CLI - personal expense tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{add, categories, delete, export, import, list, logs, status, summary};

/// Money Log - personal expense tracking in your terminal
#[derive(Parser)]
#[command(name = "moneylog", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an income or expense entry
    Add {
        /// Amount (non-negative; the type carries the sign)
        amount: String,
        /// Category (defaults to the first configured one)
        #[arg(short, long)]
        category: Option<String>,
        /// Entry type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text memo
        #[arg(short, long)]
        memo: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded transactions
    List {
        /// Show oldest entries first
        #[arg(long)]
        oldest_first: bool,
        /// Show newest entries first, whatever the configured order
        #[arg(long, conflicts_with = "oldest_first")]
        newest_first: bool,
        /// Maximum number of entries to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Only entries in this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show balance, totals and expenses by category
    Summary {
        /// Only entries in this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every transaction to a JSON backup file
    Export {
        /// Write to this exact path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for the conventionally named backup (defaults to the current directory)
        #[arg(long, conflicts_with = "output")]
        dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import transactions from a JSON backup file
    Import {
        /// Path to backup file (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ledger status and database details
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or edit the configured categories
    Categories {
        #[command(subcommand)]
        command: Option<categories::CategoriesCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Delete { .. } => "delete",
            Commands::Summary { .. } => "summary",
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Status { .. } => "status",
            Commands::Categories { .. } => "categories",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let name = cli.command.name();
    let result = run(cli);

    // The logs command manages the log itself
    if name != "logs" {
        commands::log_outcome(name, &result);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { amount, category, kind, date, memo, json } => {
            add::run(amount, category, kind, date, memo, json)
        }
        Commands::List { oldest_first, newest_first, limit, month, json } => {
            list::run(oldest_first, newest_first, limit, month, json)
        }
        Commands::Delete { id, force, json } => delete::run(id, force, json),
        Commands::Summary { month, json } => summary::run(month, json),
        Commands::Export { output, dir, json } => export::run(output, dir, json),
        Commands::Import { file, force, json } => import::run(file, force, json),
        Commands::Status { json } => status::run(json),
        Commands::Categories { command, json } => categories::run(command, json),
        Commands::Logs { command } => logs::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_order_flags() {
        let cli = Cli::try_parse_from(["moneylog", "list", "--newest-first"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List { newest_first: true, oldest_first: false, .. }
        ));

        assert!(Cli::try_parse_from(["moneylog", "list", "--newest-first", "--oldest-first"]).is_err());
    }

    #[test]
    fn test_categories_lists_without_subcommand() {
        let cli = Cli::try_parse_from(["moneylog", "categories", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Categories { command: None, json: true }));

        let cli = Cli::try_parse_from(["moneylog", "categories", "add", "rent"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Categories { command: Some(categories::CategoriesCommands::Add { .. }), .. }
        ));
    }
}
