//! Monthly sales trend by brand, optionally segmented by customer gender
//! and income bucket. Also hosts the per-model best-month lookup, which
//! uses the same month grouping.

use crate::{
    error::AnalyticsResult,
    fact::{Gender, SaleFact},
    pipeline::{filter_range, group_tally, month_start, Tally},
    query::DateRange,
    types::{BrandId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ── Income buckets ──────────────────────────────────────────────────────────

/// Customer income band. Bounds are half-open `[low, high)` in local
/// currency units; "w" is ten thousand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeBucket {
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "[0,1w)")]
    Below10k,
    #[serde(rename = "[1w,2w)")]
    From10kTo20k,
    #[serde(rename = "[2w,3w)")]
    From20kTo30k,
    #[serde(rename = "[3w,5w)")]
    From30kTo50k,
    #[serde(rename = "[5w,10w)")]
    From50kTo100k,
    #[serde(rename = "10w+")]
    From100k,
}

impl IncomeBucket {
    pub fn classify(income: Option<Money>) -> Self {
        let Some(income) = income else {
            return IncomeBucket::Unknown;
        };
        if income < Money::from(10_000) {
            IncomeBucket::Below10k
        } else if income < Money::from(20_000) {
            IncomeBucket::From10kTo20k
        } else if income < Money::from(30_000) {
            IncomeBucket::From20kTo30k
        } else if income < Money::from(50_000) {
            IncomeBucket::From30kTo50k
        } else if income < Money::from(100_000) {
            IncomeBucket::From50kTo100k
        } else {
            IncomeBucket::From100k
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeBucket::Unknown => "Unknown",
            IncomeBucket::Below10k => "[0,1w)",
            IncomeBucket::From10kTo20k => "[1w,2w)",
            IncomeBucket::From20kTo30k => "[2w,3w)",
            IncomeBucket::From30kTo50k => "[3w,5w)",
            IncomeBucket::From50kTo100k => "[5w,10w)",
            IncomeBucket::From100k => "10w+",
        }
    }
}

// Buckets sort by label text, not by income: reports order them the way
// the stored labels collate.
impl Ord for IncomeBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(other.label())
    }
}

impl PartialOrd for IncomeBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Trend ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub brand_id:      BrandId,
    pub brand_name:    String,
    /// First calendar day of the month.
    pub month:         NaiveDate,
    pub units:         i64,
    pub revenue:       Money,
    pub gender:        Option<Gender>,
    pub income_bucket: Option<IncomeBucket>,
}

/// Field order is the output order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TrendKey {
    month:         NaiveDate,
    brand_name:    String,
    brand_id:      BrandId,
    gender:        Option<Gender>,
    income_bucket: Option<IncomeBucket>,
}

/// Monthly units and revenue per brand for sales in `range`.
///
/// Months with no sales produce no point.
pub fn trend(
    facts: &[SaleFact],
    range: &DateRange,
    segmented: bool,
) -> AnalyticsResult<Vec<TrendPoint>> {
    let groups = group_tally(filter_range(facts, range), |f| TrendKey {
        month:         month_start(f.sale_date),
        brand_name:    f.brand_name.clone(),
        brand_id:      f.brand_id,
        gender:        segmented.then_some(f.customer_gender),
        income_bucket: segmented.then(|| IncomeBucket::classify(f.customer_income)),
    })?;

    let points = groups
        .into_iter()
        .map(|(key, tally)| TrendPoint {
            brand_id:      key.brand_id,
            brand_name:    key.brand_name,
            month:         key.month,
            units:         tally.units,
            revenue:       tally.revenue,
            gender:        key.gender,
            income_bucket: key.income_bucket,
        })
        .collect();
    Ok(points)
}

// ── Best month ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBestMonth {
    pub model_name: String,
    pub month:      NaiveDate,
    pub units:      i64,
    pub revenue:    Money,
}

/// The month in `range` with the most sales of `model_name`, revenue
/// breaking ties, then the earlier month. `None` when the model has no
/// sales in range.
pub fn model_best_month(
    facts: &[SaleFact],
    model_name: &str,
    range: &DateRange,
) -> AnalyticsResult<Option<ModelBestMonth>> {
    let groups = group_tally(
        filter_range(facts, range).filter(|f| f.model_name == model_name),
        |f| month_start(f.sale_date),
    )?;

    let mut best: Option<(NaiveDate, Tally)> = None;
    for (month, tally) in groups {
        let better = match &best {
            None => true,
            Some((_, b)) => (tally.units, tally.revenue) > (b.units, b.revenue),
        };
        if better {
            best = Some((month, tally));
        }
    }

    Ok(best.map(|(month, tally)| ModelBestMonth {
        model_name: model_name.to_string(),
        month,
        units: tally.units,
        revenue: tally.revenue,
    }))
}
