//! Sale-price distribution: min, mean, median and p95.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    fact::SaleFact,
    pipeline::filter_range,
    query::DateRange,
    types::Money,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price statistics for a filtered sample.
///
/// All statistics are `None` when `sample_count` is zero: an empty sample
/// means "no data", not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min:          Option<Money>,
    pub avg:          Option<Money>,
    pub median:       Option<Money>,
    pub p95:          Option<Money>,
    pub sample_count: i64,
}

/// Summarize prices of sales in `range`, optionally restricted by exact
/// brand and/or model name.
pub fn price_summary(
    facts: &[SaleFact],
    range: &DateRange,
    brand: Option<&str>,
    model: Option<&str>,
) -> AnalyticsResult<PriceSummary> {
    let mut sample: Vec<Money> = filter_range(facts, range)
        .filter(|f| brand.map_or(true, |b| f.brand_name == b))
        .filter(|f| model.map_or(true, |m| f.model_name == m))
        .map(|f| f.sale_price)
        .collect();
    sample.sort();
    summarize_sorted(&sample)
}

/// Build a summary from an ascending sample.
pub fn summarize_sorted(sample: &[Money]) -> AnalyticsResult<PriceSummary> {
    let Some(&min) = sample.first() else {
        return Ok(PriceSummary::default());
    };
    let n = sample.len();
    let total = sample
        .iter()
        .try_fold(Money::ZERO, |acc, p| acc.checked_add(*p))
        .ok_or(AnalyticsError::Overflow { what: "price total" })?;

    Ok(PriceSummary {
        min:          Some(min),
        avg:          Some(total / Decimal::from(n as u64)),
        median:       percentile_cont(sample, Decimal::new(5, 1)),
        p95:          percentile_cont(sample, Decimal::new(95, 2)),
        sample_count: n as i64,
    })
}

/// Continuous percentile with linear interpolation between closest ranks.
///
/// For an ascending sample of size n and fraction f in [0, 1]:
/// `r = f * (n - 1)`, result `s[floor r] + (r - floor r) * (s[ceil r] - s[floor r])`.
///
/// `None` for an empty sample or when the interpolation overflows.
pub fn percentile_cont(sorted: &[Money], fraction: Decimal) -> Option<Money> {
    let last = sorted.len().checked_sub(1)?;
    let fraction = fraction.clamp(Decimal::ZERO, Decimal::ONE);
    let rank = fraction * Decimal::from(last as u64);
    let lo_rank = rank.floor();
    let lo = lo_rank.to_usize()?.min(last);
    let hi = rank.ceil().to_usize()?.min(last);
    let weight = rank - lo_rank;
    let spread = sorted[hi].checked_sub(sorted[lo])?;
    sorted[lo].checked_add(weight.checked_mul(spread)?)
}
