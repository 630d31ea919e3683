mod common;

use carco_core::{
    config::{AnalyticsConfig, LimitPolicy},
    engine::AnalyticsEngine,
    error::{AnalyticsError, AnalyticsResult},
    fact::{InventoryDwellFact, SaleFact, TransmissionInstallFact},
    query::{
        CancelToken, DateRange, DwellQuery, InstallQuery, PriceOptions, QueryContext, RankMetric,
        SaleQuery, TopOptions, TrendOptions,
    },
    source::{CatalogEntry, CatalogResolver, CatalogTransmission, FactSource, MemoryFactSource},
    store::FactStore,
    types::ColorId,
};
use common::{d, range, sale};
use rust_decimal_macros::dec;
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Wraps a memory source and counts reads, or fails every read.
struct CountingSource {
    inner: MemoryFactSource,
    reads: Cell<usize>,
    fail:  bool,
}

impl CountingSource {
    fn new(inner: MemoryFactSource) -> Self {
        Self { inner, reads: Cell::new(0), fail: false }
    }

    fn failing() -> Self {
        Self { fail: true, ..Self::new(MemoryFactSource::new()) }
    }

    fn touch(&self) -> AnalyticsResult<()> {
        self.reads.set(self.reads.get() + 1);
        if self.fail {
            return Err(AnalyticsError::UpstreamUnavailable { reason: "source offline".into() });
        }
        Ok(())
    }
}

impl FactSource for CountingSource {
    fn sales(&self, query: &SaleQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>> {
        self.touch()?;
        self.inner.sales(query, ctx)
    }

    fn dwell(&self, query: &DwellQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<InventoryDwellFact>> {
        self.touch()?;
        self.inner.dwell(query, ctx)
    }

    fn installs(
        &self,
        query: &InstallQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>> {
        self.touch()?;
        self.inner.installs(query, ctx)
    }
}

impl CatalogResolver for CountingSource {
    fn color_names(&self, ids: &[ColorId]) -> AnalyticsResult<HashMap<ColorId, String>> {
        self.inner.color_names(ids)
    }
    fn brands(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        self.inner.brands()
    }
    fn models_by_brand(&self, brand_name: &str) -> AnalyticsResult<Vec<CatalogEntry>> {
        self.inner.models_by_brand(brand_name)
    }
    fn colors(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        self.inner.colors()
    }
    fn suppliers(&self) -> AnalyticsResult<Vec<CatalogEntry>> {
        self.inner.suppliers()
    }
    fn transmissions(&self) -> AnalyticsResult<Vec<CatalogTransmission>> {
        self.inner.transmissions()
    }
}

fn backwards() -> DateRange {
    DateRange { start: d(2024, 3, 31), end: d(2024, 3, 1) }
}

fn many_sales(n: i64) -> MemoryFactSource {
    let sales = (1..=n).map(|i| sale(i, d(2024, 3, 1), 1, "Acme", dec!(1))).collect();
    MemoryFactSource::new().with_sales(sales)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// End before start is rejected by the constructor.
#[test]
fn date_range_rejects_end_before_start() {
    let err = DateRange::new(d(2024, 3, 31), d(2024, 3, 1)).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidRange { .. }));
    assert!(DateRange::new(d(2024, 3, 1), d(2024, 3, 1)).is_ok());
}

/// A bad range fails before the fact source is read.
#[test]
fn invalid_range_fails_before_source_read() {
    let engine = AnalyticsEngine::with_defaults(CountingSource::new(many_sales(3)));
    let ctx = QueryContext::new();

    let err = engine
        .sales_trend(&TrendOptions { range: backwards(), segment: false }, &ctx)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidRange { .. }));

    let err = engine
        .price_summary(&PriceOptions { range: backwards(), brand: None, model: None }, &ctx)
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidRange { .. }));

    assert_eq!(engine.source().reads.get(), 0);
}

/// Source failures propagate and are flagged as upstream.
#[test]
fn upstream_failure_propagates() {
    let engine = AnalyticsEngine::with_defaults(CountingSource::failing());
    let err = engine
        .top_brands(
            &TopOptions {
                range: range(d(2024, 1, 1), d(2024, 1, 31)),
                metric: RankMetric::Units,
                limit: None,
                brand: None,
            },
            &QueryContext::new(),
        )
        .unwrap_err();
    assert!(err.is_upstream());
    assert!(matches!(err, AnalyticsError::UpstreamUnavailable { .. }));
    assert_eq!(engine.source().reads.get(), 1);
}

/// A SQLite store without its schema fails with a SQL error.
#[test]
fn sqlite_error_is_upstream() {
    let store = FactStore::in_memory().unwrap();
    let engine = AnalyticsEngine::with_defaults(store);
    let err = engine
        .sales_trend(
            &TrendOptions { range: range(d(2024, 1, 1), d(2024, 1, 31)), segment: false },
            &QueryContext::new(),
        )
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Upstream(_)));
    assert!(err.is_upstream());
}

/// A cancelled token aborts the query with no partial result.
#[test]
fn cancelled_query_aborts() {
    let engine = AnalyticsEngine::with_defaults(many_sales(100));
    let token = CancelToken::new();
    let ctx = QueryContext::new().with_cancel(token.clone());
    token.cancel();

    let err = engine
        .sales_trend(
            &TrendOptions { range: range(d(2024, 1, 1), d(2024, 12, 31)), segment: false },
            &ctx,
        )
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Cancelled));
    assert!(!err.is_upstream());
}

/// An expired deadline aborts the query.
#[test]
fn expired_deadline_aborts() {
    let engine = AnalyticsEngine::with_defaults(many_sales(10));
    let ctx = QueryContext::new().with_timeout(Duration::ZERO);
    let err = engine
        .sales_trend(
            &TrendOptions { range: range(d(2024, 1, 1), d(2024, 12, 31)), segment: false },
            &ctx,
        )
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::DeadlineExceeded));
}

/// Limit clamping: missing, non-positive or above-ceiling means default.
#[test]
fn limit_policy_clamp() {
    let p = LimitPolicy::new(10, 100);
    assert_eq!(p.clamp(None), 10);
    assert_eq!(p.clamp(Some(0)), 10);
    assert_eq!(p.clamp(Some(-5)), 10);
    assert_eq!(p.clamp(Some(101)), 10);
    assert_eq!(p.clamp(Some(10_000)), 10);
    assert_eq!(p.clamp(Some(1)), 1);
    assert_eq!(p.clamp(Some(100)), 100);
}

/// Config files may override some policies; the rest keep defaults.
#[test]
fn config_load_partial_file() {
    let path = std::env::temp_dir().join(format!("carco-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "top_brands": { "default": 3, "max": 5 } }"#).unwrap();

    let config = AnalyticsConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.top_brands, LimitPolicy::new(3, 5));
    assert_eq!(config.top_models, AnalyticsConfig::default().top_models);

    std::fs::write(&path, r#"{ "top_colors": { "default": 0, "max": 5 } }"#).unwrap();
    assert!(AnalyticsConfig::load(path.to_str().unwrap()).is_err());
    std::fs::remove_file(&path).unwrap();
}
