//! Fact-source and catalog contracts.
//!
//! RULE: the engine reads facts only through these traits. It owns no
//! storage and never writes back.

use crate::{
    error::AnalyticsResult,
    fact::{InventoryDwellFact, SaleFact, TransmissionInstallFact},
    query::{DwellQuery, InstallQuery, QueryContext, SaleQuery},
    types::ColorId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only supplier of the three fact kinds.
///
/// Query arguments are optional pre-filters. Implementations should check
/// `ctx` while reading and abort promptly when it fails.
pub trait FactSource {
    fn sales(&self, query: &SaleQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>>;

    fn dwell(
        &self,
        query: &DwellQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<InventoryDwellFact>>;

    fn installs(
        &self,
        query: &InstallQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>>;
}

/// Catalog entry: id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id:   i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTransmission {
    pub id:        i64,
    pub name:      String,
    pub spec_code: String,
}

/// Key → display-name lookups. Listings are ordered by name.
pub trait CatalogResolver {
    /// Resolve the given color ids. Ids with no catalog entry are absent
    /// from the returned map.
    fn color_names(&self, ids: &[ColorId]) -> AnalyticsResult<HashMap<ColorId, String>>;

    fn brands(&self) -> AnalyticsResult<Vec<CatalogEntry>>;

    fn models_by_brand(&self, brand_name: &str) -> AnalyticsResult<Vec<CatalogEntry>>;

    fn colors(&self) -> AnalyticsResult<Vec<CatalogEntry>>;

    fn suppliers(&self) -> AnalyticsResult<Vec<CatalogEntry>>;

    fn transmissions(&self) -> AnalyticsResult<Vec<CatalogTransmission>>;
}

// ── In-memory source ────────────────────────────────────────────────────────

/// Fact source over vectors held in memory. Used by tests and by callers
/// that already hold a snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactSource {
    pub sales:     Vec<SaleFact>,
    pub dwell:     Vec<InventoryDwellFact>,
    pub installs:  Vec<TransmissionInstallFact>,
    pub colors:    Vec<CatalogEntry>,
}

impl MemoryFactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sales(mut self, sales: Vec<SaleFact>) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_dwell(mut self, dwell: Vec<InventoryDwellFact>) -> Self {
        self.dwell = dwell;
        self
    }

    pub fn with_installs(mut self, installs: Vec<TransmissionInstallFact>) -> Self {
        self.installs = installs;
        self
    }

    pub fn with_color(mut self, id: ColorId, name: &str) -> Self {
        self.colors.push(CatalogEntry { id, name: name.to_string() });
        self
    }
}

impl FactSource for MemoryFactSource {
    fn sales(&self, query: &SaleQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>> {
        let mut out = Vec::new();
        for fact in &self.sales {
            ctx.check()?;
            if query.range.is_some_and(|r| !r.contains(fact.sale_date)) {
                continue;
            }
            if query.brand.as_deref().is_some_and(|b| b != fact.brand_name) {
                continue;
            }
            if query.model.as_deref().is_some_and(|m| m != fact.model_name) {
                continue;
            }
            out.push(fact.clone());
        }
        Ok(out)
    }

    fn dwell(
        &self,
        query: &DwellQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<InventoryDwellFact>> {
        let mut out = Vec::new();
        for fact in &self.dwell {
            ctx.check()?;
            if let Some(range) = query.sold_in {
                match fact.sale_date {
                    Some(d) if range.contains(d) => {}
                    _ => continue,
                }
            }
            if query.unsold_only && fact.is_sold() {
                continue;
            }
            if query.dealer_id.is_some_and(|id| id != fact.dealer_id) {
                continue;
            }
            out.push(fact.clone());
        }
        Ok(out)
    }

    fn installs(
        &self,
        query: &InstallQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>> {
        let mut out = Vec::new();
        for fact in &self.installs {
            ctx.check()?;
            if query.supplier.as_deref().is_some_and(|s| s != fact.supplier_name) {
                continue;
            }
            if query.produced_in.is_some_and(|r| !r.contains(fact.production_date)) {
                continue;
            }
            out.push(fact.clone());
        }
        Ok(out)
    }
}

impl CatalogResolver for MemoryFactSource {
    fn color_names(&self, ids: &[ColorId]) -> AnalyticsResult<HashMap<ColorId, String>> {
        Ok(self
            .colors
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| (c.id, c.name.clone()))
            .collect())
    }

    fn brands(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut seen: HashMap<i64, String> = HashMap::new();
        for s in &self.sales {
            seen.entry(s.brand_id).or_insert_with(|| s.brand_name.clone());
        }
        Ok(sorted_entries(seen))
    }

    fn models_by_brand(&self, brand_name: &str) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut seen: HashMap<i64, String> = HashMap::new();
        for s in self.sales.iter().filter(|s| s.brand_name == brand_name) {
            seen.entry(s.model_id).or_insert_with(|| s.model_name.clone());
        }
        Ok(sorted_entries(seen))
    }

    fn colors(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut colors = self.colors.clone();
        colors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(colors)
    }

    fn suppliers(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        let mut seen: HashMap<i64, String> = HashMap::new();
        for i in &self.installs {
            seen.entry(i.supplier_id).or_insert_with(|| i.supplier_name.clone());
        }
        Ok(sorted_entries(seen))
    }

    fn transmissions(&self) -> AnalyticsResult<Vec<CatalogTransmission>> {
        let mut seen: HashMap<i64, String> = HashMap::new();
        for i in &self.installs {
            seen.entry(i.part_spec_id).or_insert_with(|| i.part_spec_name.clone());
        }
        Ok(sorted_entries(seen)
            .into_iter()
            .map(|e| CatalogTransmission { id: e.id, name: e.name, spec_code: String::new() })
            .collect())
    }
}

fn sorted_entries(map: HashMap<i64, String>) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> =
        map.into_iter().map(|(id, name)| CatalogEntry { id, name }).collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    entries
}
