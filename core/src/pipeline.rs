//! Shared aggregation stages: filter → group → reduce → order → limit.
//!
//! Groups are collected into a `BTreeMap` so iteration order is a pure
//! function of the keys. Reports that sort by a metric use a stable sort on
//! top of that order, which makes every tie-break deterministic.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    fact::SaleFact,
    query::{DateRange, RankMetric},
    types::Money,
};
use chrono::{Datelike, Days, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Count and revenue for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub units:   i64,
    pub revenue: Money,
}

impl Tally {
    pub fn add(&mut self, price: Money) -> AnalyticsResult<()> {
        let overflow = || AnalyticsError::Overflow { what: "revenue" };
        self.revenue = self.revenue.checked_add(price).ok_or_else(overflow)?;
        self.units = self.units.checked_add(1).ok_or_else(overflow)?;
        Ok(())
    }

    pub fn cmp_by(&self, other: &Self, metric: RankMetric) -> Ordering {
        match metric {
            RankMetric::Units => self.units.cmp(&other.units),
            RankMetric::Revenue => self.revenue.cmp(&other.revenue),
        }
    }
}

/// Stage 1: keep sales dated inside the closed range.
pub fn filter_range<'a>(
    facts: &'a [SaleFact],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a SaleFact> + 'a {
    facts.iter().filter(move |f| range.contains(f.sale_date))
}

/// Stages 2 and 3: group by `key` and tally units and revenue.
///
/// Fails with `Overflow` rather than wrapping when a revenue total no
/// longer fits in a decimal.
pub fn group_tally<'a, K, I, F>(facts: I, key: F) -> AnalyticsResult<BTreeMap<K, Tally>>
where
    K: Ord,
    I: IntoIterator<Item = &'a SaleFact>,
    F: Fn(&SaleFact) -> K,
{
    let mut groups: BTreeMap<K, Tally> = BTreeMap::new();
    for fact in facts {
        groups.entry(key(fact)).or_default().add(fact.sale_price)?;
    }
    Ok(groups)
}

/// Stage 5: truncate to `limit` rows.
pub fn take<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.truncate(limit);
    rows
}

/// First calendar day of the month containing `date`.
///
/// Sorting by this key is the same as sorting by (year, month).
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}
