//! SQLite fact store.
//!
//! RULE: Only the store talks to the database.
//! Aggregation modules receive facts; they never execute SQL.

use crate::{
    error::AnalyticsResult,
    fact::{InventoryDwellFact, SaleFact, TransmissionInstallFact},
    query::{DwellQuery, InstallQuery, QueryContext, SaleQuery},
    source::FactSource,
    types::Money,
};
use rusqlite::{types::Type, Connection, Row};
use std::str::FromStr;

mod catalog;
mod inventory;
mod recall;
mod sales;

pub struct FactStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl FactStore {
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> AnalyticsResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_schema.sql"))?;
        Ok(())
    }

    /// Run `f` inside one transaction. Used by bulk loaders.
    pub fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Self) -> AnalyticsResult<T>,
    ) -> AnalyticsResult<T> {
        self.conn.execute_batch("BEGIN;")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(e)
            }
        }
    }
}

// ── Column helpers ────────────────────────────────────────────────────────

/// Read a decimal stored as text.
pub(crate) fn money_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Money> {
    let text: String = row.get(idx)?;
    Money::from_str(text.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_money_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Money>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(text) => Money::from_str(text.trim())
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

/// Drain mapped rows, checking the caller's context between rows.
pub(crate) fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
    ctx: &QueryContext,
) -> AnalyticsResult<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        ctx.check()?;
        out.push(row?);
    }
    Ok(out)
}

impl FactSource for FactStore {
    fn sales(&self, query: &SaleQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>> {
        self.sale_facts(query, ctx)
    }

    fn dwell(
        &self,
        query: &DwellQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<InventoryDwellFact>> {
        self.dwell_facts(query, ctx)
    }

    fn installs(
        &self,
        query: &InstallQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>> {
        self.install_facts(query, ctx)
    }
}
