//! Top-N rankings over sales: brands, models, dealers and colors.
//!
//! Every ranking runs the same stages: range filter, group, tally, order
//! descending by metric, truncate. The grouping key's natural order is the
//! final tie-break (lowest id, or alphabetical model name).

use crate::{
    error::AnalyticsResult,
    fact::SaleFact,
    pipeline::{filter_range, group_tally, take, Tally},
    query::{DateRange, RankMetric},
    source::CatalogResolver,
    types::{BrandId, ColorId, DealerId, Money},
};
use serde::{Deserialize, Serialize};

// ── Summary rows ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub brand_id:   BrandId,
    pub brand_name: String,
    pub units:      i64,
    pub revenue:    Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_name: String,
    pub units:      i64,
    pub revenue:    Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerSummary {
    pub dealer_id:   DealerId,
    pub dealer_name: String,
    pub units:       i64,
    pub revenue:     Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSummary {
    pub color_id:   ColorId,
    pub color_name: String,
    pub units:      i64,
}

// ── Generic ranking ─────────────────────────────────────────────────────────

/// What to group a ranking by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankGroup {
    Brand,
    Model,
    Dealer,
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    Brand { id: BrandId, name: String },
    Model { name: String },
    Dealer { id: DealerId, name: String },
    Color { id: ColorId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub key:     GroupKey,
    pub units:   i64,
    /// Absent for color rankings, which only count units.
    pub revenue: Option<Money>,
}

/// Sort order used for a group. Model rankings always use units then
/// revenue, whatever metric was asked for.
pub fn ordering_for(group: RankGroup, metric: RankMetric) -> &'static [RankMetric] {
    match (group, metric) {
        (RankGroup::Model, _) => &[RankMetric::Units, RankMetric::Revenue],
        (RankGroup::Color, _) => &[RankMetric::Units],
        (_, RankMetric::Units) => &[RankMetric::Units],
        (_, RankMetric::Revenue) => &[RankMetric::Revenue],
    }
}

/// Group, tally, order descending by `order`, and keep `limit` rows.
pub fn rank_groups<K, F>(
    facts: &[SaleFact],
    range: &DateRange,
    key: F,
    order: &[RankMetric],
    limit: usize,
) -> AnalyticsResult<Vec<(K, Tally)>>
where
    K: Ord,
    F: Fn(&SaleFact) -> K,
{
    let mut rows: Vec<(K, Tally)> = group_tally(filter_range(facts, range), key)?
        .into_iter()
        .collect();

    // Stable sort: rows equal on every metric keep key order.
    rows.sort_by(|(_, a), (_, b)| {
        order
            .iter()
            .map(|m| b.cmp_by(a, *m))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(take(rows, limit))
}

/// Rank sales in `range` by `group`. `limit` must already be clamped.
pub fn top_n(
    facts: &[SaleFact],
    range: &DateRange,
    limit: usize,
    metric: RankMetric,
    group: RankGroup,
) -> AnalyticsResult<Vec<RankedRow>> {
    let key = |f: &SaleFact| match group {
        RankGroup::Brand => GroupKey::Brand { id: f.brand_id, name: f.brand_name.clone() },
        RankGroup::Model => GroupKey::Model { name: f.model_name.clone() },
        RankGroup::Dealer => GroupKey::Dealer { id: f.dealer_id, name: f.dealer_name.clone() },
        RankGroup::Color => GroupKey::Color { id: f.color_id },
    };

    let rows = rank_groups(facts, range, key, ordering_for(group, metric), limit)?
        .into_iter()
        .map(|(key, tally)| RankedRow {
            key,
            units: tally.units,
            revenue: (group != RankGroup::Color).then_some(tally.revenue),
        })
        .collect();
    Ok(rows)
}

// ── Typed rankings ──────────────────────────────────────────────────────────

pub fn top_brands(
    facts: &[SaleFact],
    range: &DateRange,
    metric: RankMetric,
    limit: usize,
) -> AnalyticsResult<Vec<BrandSummary>> {
    let rows = rank_groups(
        facts,
        range,
        |f| (f.brand_id, f.brand_name.clone()),
        ordering_for(RankGroup::Brand, metric),
        limit,
    )?
    .into_iter()
    .map(|((brand_id, brand_name), t)| BrandSummary {
        brand_id,
        brand_name,
        units: t.units,
        revenue: t.revenue,
    })
    .collect();
    Ok(rows)
}

/// Model ranking, optionally restricted to one brand by exact name.
pub fn top_models(
    facts: &[SaleFact],
    range: &DateRange,
    brand: Option<&str>,
    limit: usize,
) -> AnalyticsResult<Vec<ModelSummary>> {
    let scoped: Vec<SaleFact>;
    let facts = match brand {
        Some(brand) => {
            scoped = facts.iter().filter(|f| f.brand_name == brand).cloned().collect();
            &scoped[..]
        }
        None => facts,
    };

    let rows = rank_groups(
        facts,
        range,
        |f| f.model_name.clone(),
        ordering_for(RankGroup::Model, RankMetric::Units),
        limit,
    )?
    .into_iter()
    .map(|(model_name, t)| ModelSummary { model_name, units: t.units, revenue: t.revenue })
    .collect();
    Ok(rows)
}

pub fn top_dealers(
    facts: &[SaleFact],
    range: &DateRange,
    metric: RankMetric,
    limit: usize,
) -> AnalyticsResult<Vec<DealerSummary>> {
    let rows = rank_groups(
        facts,
        range,
        |f| (f.dealer_id, f.dealer_name.clone()),
        ordering_for(RankGroup::Dealer, metric),
        limit,
    )?
    .into_iter()
    .map(|((dealer_id, dealer_name), t)| DealerSummary {
        dealer_id,
        dealer_name,
        units: t.units,
        revenue: t.revenue,
    })
    .collect();
    Ok(rows)
}

/// Color ranking by units. Names are resolved only for the rows that
/// survive truncation; colors missing from the catalog are dropped.
pub fn top_colors<R>(
    facts: &[SaleFact],
    range: &DateRange,
    limit: usize,
    resolver: &R,
) -> AnalyticsResult<Vec<ColorSummary>>
where
    R: CatalogResolver + ?Sized,
{
    let ranked = rank_groups(
        facts,
        range,
        |f| f.color_id,
        ordering_for(RankGroup::Color, RankMetric::Units),
        limit,
    )?;

    let ids: Vec<ColorId> = ranked.iter().map(|(id, _)| *id).collect();
    let names = resolver.color_names(&ids)?;

    let mut out = Vec::with_capacity(ranked.len());
    for (color_id, tally) in ranked {
        match names.get(&color_id) {
            Some(name) => out.push(ColorSummary {
                color_id,
                color_name: name.clone(),
                units: tally.units,
            }),
            None => log::warn!("top colors: color_id={color_id} has no catalog entry, dropped"),
        }
    }
    Ok(out)
}
