//! Dimension tables and catalog lookups.

use super::FactStore;
use crate::{
    error::AnalyticsResult,
    fact::Gender,
    source::{CatalogEntry, CatalogResolver, CatalogTransmission},
    types::{BrandId, ColorId, CustomerId, DealerId, ModelId, Money, PartSpecId, SupplierId},
};
use rusqlite::params;
use std::collections::HashMap;

fn entry_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id:   row.get(0)?,
        name: row.get(1)?,
    })
}

impl FactStore {
    // ── Dimension inserts ──────────────────────────────────────

    pub fn insert_brand(&self, name: &str) -> AnalyticsResult<BrandId> {
        self.conn
            .execute("INSERT INTO brand (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_model(&self, brand_id: BrandId, name: &str) -> AnalyticsResult<ModelId> {
        self.conn.execute(
            "INSERT INTO model (brand_id, name) VALUES (?1, ?2)",
            params![brand_id, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_color(&self, name: &str) -> AnalyticsResult<ColorId> {
        self.conn
            .execute("INSERT INTO color (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_supplier(&self, name: &str) -> AnalyticsResult<SupplierId> {
        self.conn
            .execute("INSERT INTO supplier (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a part spec, creating its category on first use.
    pub fn insert_part_spec(
        &self,
        category: &str,
        name: &str,
        spec_code: &str,
    ) -> AnalyticsResult<PartSpecId> {
        self.conn.execute(
            "INSERT OR IGNORE INTO part_category (name) VALUES (?1)",
            params![category],
        )?;
        let category_id: i64 = self.conn.query_row(
            "SELECT category_id FROM part_category WHERE name = ?1",
            params![category],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO part_spec (category_id, name, spec_code) VALUES (?1, ?2, ?3)",
            params![category_id, name, spec_code],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_dealer(&self, name: &str, city: &str, province: &str) -> AnalyticsResult<DealerId> {
        self.conn.execute(
            "INSERT INTO dealer (name, city, province) VALUES (?1, ?2, ?3)",
            params![name, city, province],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_customer(
        &self,
        name: &str,
        gender: Gender,
        income: Option<Money>,
        city: Option<&str>,
    ) -> AnalyticsResult<CustomerId> {
        self.conn.execute(
            "INSERT INTO customer (name, gender, income, city) VALUES (?1, ?2, ?3, ?4)",
            params![name, gender.code(), income.map(|i| i.to_string()), city],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl CatalogResolver for FactStore {
    fn color_names(&self, ids: &[ColorId]) -> AnalyticsResult<HashMap<ColorId, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT color_id, name FROM color WHERE color_id = ?1")?;
        let mut names = HashMap::with_capacity(ids.len());
        for id in ids {
            let mut rows = stmt.query_map(params![id], entry_row_mapper)?;
            if let Some(entry) = rows.next() {
                let entry = entry?;
                names.insert(entry.id, entry.name);
            }
        }
        Ok(names)
    }

    fn brands(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT brand_id, name FROM brand ORDER BY name, brand_id")?;
        let rows = stmt.query_map([], entry_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn models_by_brand(&self, brand_name: &str) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.model_id, m.name
             FROM model m JOIN brand b ON b.brand_id = m.brand_id
             WHERE b.name = ?1
             ORDER BY m.name, m.model_id",
        )?;
        let rows = stmt.query_map(params![brand_name], entry_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn colors(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT color_id, name FROM color ORDER BY name, color_id")?;
        let rows = stmt.query_map([], entry_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn suppliers(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT supplier_id, name FROM supplier ORDER BY name, supplier_id")?;
        let rows = stmt.query_map([], entry_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn transmissions(&self) -> AnalyticsResult<Vec<CatalogTransmission>> {
        let mut stmt = self.conn.prepare(
            "SELECT ps.part_spec_id, ps.name, ps.spec_code
             FROM part_spec ps JOIN part_category pc ON pc.category_id = ps.category_id
             WHERE lower(pc.name) = 'transmission'
             ORDER BY ps.name, ps.part_spec_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CatalogTransmission {
                id:        row.get(0)?,
                name:      row.get(1)?,
                spec_code: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
