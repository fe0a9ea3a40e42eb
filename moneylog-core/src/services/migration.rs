//! Migration service - applies embedded SQL migrations
//!
//! Both the ledger database and the event log database use this service, each
//! with its own migration set. Applied migrations are recorded by name in
//! `sys_migrations`, so running the service twice is a no-op.

use anyhow::{Context, Result};
use duckdb::Connection;

use crate::migrations::MIGRATIONS;

/// Name of the bootstrap migration that creates `sys_migrations`
const BOOTSTRAP: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: &'static [(&'static str, &'static str)],
}

impl<'a> MigrationService<'a> {
    /// Migration service for the ledger database
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_migrations(conn, MIGRATIONS)
    }

    /// Migration service for an arbitrary embedded migration set
    ///
    /// The set must contain a `000_migrations.sql` entry creating `sys_migrations`.
    pub fn with_migrations(
        conn: &'a Connection,
        migrations: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { conn, migrations }
    }

    /// Apply every migration not yet recorded, in declaration order
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let mut applied_now = Vec::new();

        if !self.migrations_table_exists() {
            let (name, sql) = self
                .migrations
                .iter()
                .find(|(n, _)| *n == BOOTSTRAP)
                .context("migration set has no bootstrap migration")?;
            self.apply(name, sql)?;
            applied_now.push(name.to_string());
        }

        let recorded = self.get_applied()?;
        let already_applied = recorded.len() - applied_now.len();

        for (name, sql) in self.migrations.iter() {
            if recorded.iter().any(|r| r == name) {
                continue;
            }
            self.apply(name, sql)?;
            applied_now.push(name.to_string());
        }

        Ok(MigrationResult {
            applied: applied_now,
            already_applied,
        })
    }

    /// Names of recorded migrations, sorted
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Names of migrations in the set that are not recorded yet
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = if self.migrations_table_exists() {
            self.get_applied()?
        } else {
            Vec::new()
        };
        Ok(self
            .migrations
            .iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| !applied.contains(name))
            .collect())
    }

    fn migrations_table_exists(&self) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .unwrap_or(false)
    }

    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("applying migration {}", name))?;
        self.conn.execute(
            "INSERT INTO sys_migrations (migration_name) VALUES (?)",
            [name],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_migrations::LOG_MIGRATIONS;

    #[test]
    fn test_migrations_run_once() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        let first = service.run_pending().unwrap();
        assert_eq!(first.applied.len(), MIGRATIONS.len());
        assert_eq!(first.already_applied, 0);

        let second = service.run_pending().unwrap();
        assert!(second.applied.is_empty());
        assert_eq!(second.already_applied, MIGRATIONS.len());
    }

    #[test]
    fn test_pending_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);
        assert_eq!(service.get_pending().unwrap().len(), MIGRATIONS.len());

        service.run_pending().unwrap();
        assert!(service.get_pending().unwrap().is_empty());
    }

    #[test]
    fn test_log_migration_set() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::with_migrations(&conn, LOG_MIGRATIONS);
        let result = service.run_pending().unwrap();
        assert_eq!(result.applied.len(), LOG_MIGRATIONS.len());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
