//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the durable ledger file
//! - A locked in-memory map for ephemeral ledgers

pub mod duckdb;
pub mod memory;
