//! The analytics engine: validated entry points over a fact source.
//!
//! RULES:
//!   - Parameters are validated before the fact source is touched.
//!   - One read per logical query; all grouping happens in memory.
//!   - Fact-source failures propagate unchanged. No retries, no defaults.
//!   - No state survives a call. Two calls with the same inputs against an
//!     unchanged source return identical results.

use crate::{
    config::AnalyticsConfig,
    dwell::{self, DwellSummary},
    error::{AnalyticsError, AnalyticsResult},
    fact::{InventoryDwellFact, SaleFact, TransmissionInstallFact},
    inventory::{self, AgeingBucket, UnsoldVehicle},
    period::{self, ComparisonWindows, PeriodComparison},
    price::{self, PriceSummary},
    query::{
        require_name, DateRange, DwellOptions, DwellQuery, InstallQuery, PriceOptions,
        QueryContext, RecallOptions, SaleQuery, TopOptions, TrendOptions,
        UnsoldOptions,
    },
    ranking::{self, BrandSummary, ColorSummary, DealerSummary, ModelSummary},
    recall::{self, RecallByModel, RecallHit},
    source::{CatalogResolver, FactSource},
    trend::{self, ModelBestMonth, TrendPoint},
    types::DealerId,
};
use chrono::{Days, NaiveDate};

pub struct AnalyticsEngine<S> {
    source: S,
    config: AnalyticsConfig,
}

impl<S> AnalyticsEngine<S>
where
    S: FactSource + CatalogResolver,
{
    pub fn new(source: S, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    /// Engine with the built-in limit policies.
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, AnalyticsConfig::default())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn read_sales(&self, query: SaleQuery, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>> {
        if let Some(range) = &query.range {
            range.validate()?;
        }
        ctx.check()?;
        let sales = self.source.sales(&query, ctx)?;
        log::debug!("read {} sale facts", sales.len());
        Ok(sales)
    }

    fn sales_in(&self, range: DateRange, ctx: &QueryContext) -> AnalyticsResult<Vec<SaleFact>> {
        self.read_sales(SaleQuery { range: Some(range), ..SaleQuery::default() }, ctx)
    }

    // ── Trend ──────────────────────────────────────────────────

    pub fn sales_trend(
        &self,
        opts: &TrendOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TrendPoint>> {
        let sales = self.sales_in(opts.range, ctx)?;
        let points = trend::trend(&sales, &opts.range, opts.segment)?;
        log::debug!("sales trend: {} points (segment={})", points.len(), opts.segment);
        Ok(points)
    }

    pub fn model_best_month(
        &self,
        model_name: &str,
        range: DateRange,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Option<ModelBestMonth>> {
        require_name("model", model_name)?;
        let sales = self.read_sales(
            SaleQuery {
                range: Some(range),
                model: Some(model_name.to_string()),
                ..SaleQuery::default()
            },
            ctx,
        )?;
        trend::model_best_month(&sales, model_name, &range)
    }

    // ── Rankings ───────────────────────────────────────────────

    pub fn top_brands(
        &self,
        opts: &TopOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<BrandSummary>> {
        let limit = self.config.top_brands.clamp(opts.limit);
        let sales = self.sales_in(opts.range, ctx)?;
        ranking::top_brands(&sales, &opts.range, opts.metric, limit)
    }

    /// Top models overall, or within one brand when `opts.brand` is set.
    /// Always ordered by units then revenue.
    pub fn top_models(
        &self,
        opts: &TopOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<ModelSummary>> {
        if let Some(brand) = &opts.brand {
            require_name("brand", brand)?;
        }
        let limit = self.config.top_models.clamp(opts.limit);
        let sales = self.read_sales(
            SaleQuery { range: Some(opts.range), brand: opts.brand.clone(), model: None },
            ctx,
        )?;
        ranking::top_models(&sales, &opts.range, opts.brand.as_deref(), limit)
    }

    pub fn top_dealers(
        &self,
        opts: &TopOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<DealerSummary>> {
        let limit = self.config.top_dealers.clamp(opts.limit);
        let sales = self.sales_in(opts.range, ctx)?;
        ranking::top_dealers(&sales, &opts.range, opts.metric, limit)
    }

    /// Top colors by units. `opts.metric` is ignored.
    pub fn top_colors(
        &self,
        opts: &TopOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<ColorSummary>> {
        let limit = self.config.top_colors.clamp(opts.limit);
        let sales = self.sales_in(opts.range, ctx)?;
        ranking::top_colors(&sales, &opts.range, limit, &self.source)
    }

    // ── Price ──────────────────────────────────────────────────

    pub fn price_summary(
        &self,
        opts: &PriceOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<PriceSummary> {
        // Blank filters mean "no filter".
        let brand = opts.brand.as_deref().filter(|b| !b.trim().is_empty());
        let model = opts.model.as_deref().filter(|m| !m.trim().is_empty());
        let sales = self.read_sales(
            SaleQuery {
                range: Some(opts.range),
                brand: brand.map(str::to_string),
                model: model.map(str::to_string),
            },
            ctx,
        )?;
        let summary = price::price_summary(&sales, &opts.range, brand, model)?;
        log::debug!("price summary: {} samples", summary.sample_count);
        Ok(summary)
    }

    // ── Dwell ──────────────────────────────────────────────────

    pub fn longest_dwell(
        &self,
        opts: &DwellOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Option<DwellSummary>> {
        opts.range.validate()?;
        ctx.check()?;
        let dwell_facts = self.source.dwell(
            &DwellQuery { sold_in: Some(opts.range), ..DwellQuery::default() },
            ctx,
        )?;
        // A dwell row's sale date is its sale's date, so the same range
        // covers every sale the join can match.
        let sales = self.sales_in(opts.range, ctx)?;
        Ok(dwell::longest_dwell(&dwell_facts, &sales, &opts.range, opts.include_unsold))
    }

    // ── Period comparison ──────────────────────────────────────

    pub fn period_comparison(
        &self,
        month: NaiveDate,
        ctx: &QueryContext,
    ) -> AnalyticsResult<PeriodComparison> {
        let windows = ComparisonWindows::for_month(month).ok_or_else(|| {
            AnalyticsError::InvalidArgument {
                name: "month",
                reason: format!("{month} is outside the supported calendar"),
            }
        })?;
        let span = windows.span();
        // The span is half-open; the closed read range ends the day before.
        let last_day = span.end.checked_sub_days(Days::new(1)).unwrap_or(span.end);
        let sales = self.sales_in(DateRange::new(span.start, last_day)?, ctx)?;
        period::period_comparison(&sales, &windows)
    }

    // ── Recalls ────────────────────────────────────────────────

    fn read_installs(
        &self,
        opts: &RecallOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>> {
        require_name("supplier", &opts.supplier)?;
        opts.range.validate()?;
        ctx.check()?;
        let installs = self.source.installs(
            &InstallQuery { supplier: Some(opts.supplier.clone()), produced_in: Some(opts.range) },
            ctx,
        )?;
        log::debug!("read {} install facts for supplier {}", installs.len(), opts.supplier);
        Ok(installs)
    }

    pub fn recall_hits(
        &self,
        opts: &RecallOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<RecallHit>> {
        let installs = self.read_installs(opts, ctx)?;
        Ok(recall::recall_hits(&installs, &opts.supplier, &opts.range, opts.unsold_only))
    }

    /// Sold/unsold exposure per model. `opts.unsold_only` is ignored: the
    /// report always splits both.
    pub fn recall_by_model(
        &self,
        opts: &RecallOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<RecallByModel>> {
        let installs = self.read_installs(opts, ctx)?;
        Ok(recall::recall_by_model(&installs, &opts.supplier, &opts.range))
    }

    // ── Inventory ──────────────────────────────────────────────

    fn read_unsold(
        &self,
        dealer_id: Option<DealerId>,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<InventoryDwellFact>> {
        ctx.check()?;
        self.source.dwell(
            &DwellQuery { sold_in: None, unsold_only: true, dealer_id },
            ctx,
        )
    }

    pub fn unsold_inventory(
        &self,
        opts: &UnsoldOptions,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<UnsoldVehicle>> {
        let page_size = self.config.unsold_page_size.clamp(opts.page_size);
        let facts = self.read_unsold(opts.dealer_id, ctx)?;
        Ok(inventory::unsold_vehicles(&facts, opts.as_of, opts.dealer_id, opts.page, page_size))
    }

    pub fn inventory_ageing(
        &self,
        as_of: NaiveDate,
        dealer_id: Option<DealerId>,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<AgeingBucket>> {
        let facts = self.read_unsold(dealer_id, ctx)?;
        Ok(inventory::ageing(&facts, as_of, dealer_id))
    }
}
