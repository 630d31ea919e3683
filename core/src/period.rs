//! Month-over-month and year-over-year comparison.
//!
//! The engine reports raw figures for the three periods. Percent deltas are
//! left to the presentation layer; `pct_change` is provided for it.

use crate::{
    error::AnalyticsResult,
    fact::SaleFact,
    pipeline::{month_start, Tally},
    query::HalfOpenRange,
    types::Money,
};
use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// First calendar day of the target month.
    pub month:              NaiveDate,
    pub units:              i64,
    pub revenue:            Money,
    pub prev_month_units:   i64,
    pub prev_month_revenue: Money,
    pub prev_year_units:    i64,
    pub prev_year_revenue:  Money,
}

/// The three disjoint half-open windows compared for a target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonWindows {
    pub current:    HalfOpenRange,
    pub prev_month: HalfOpenRange,
    pub prev_year:  HalfOpenRange,
}

impl ComparisonWindows {
    /// Windows for the month containing `any_day`. `None` only at the edges
    /// of the representable calendar.
    pub fn for_month(any_day: NaiveDate) -> Option<Self> {
        let first = month_start(any_day);
        let next = first.checked_add_months(Months::new(1))?;
        let prev = first.checked_sub_months(Months::new(1))?;
        let prev_year = first.checked_sub_months(Months::new(12))?;
        let prev_year_next = prev_year.checked_add_months(Months::new(1))?;
        Some(Self {
            current:    HalfOpenRange { start: first, end: next },
            prev_month: HalfOpenRange { start: prev, end: first },
            prev_year:  HalfOpenRange { start: prev_year, end: prev_year_next },
        })
    }

    /// Smallest half-open range covering all three windows.
    pub fn span(&self) -> HalfOpenRange {
        HalfOpenRange { start: self.prev_year.start, end: self.current.end }
    }
}

fn sum_window(facts: &[SaleFact], window: &HalfOpenRange) -> AnalyticsResult<Tally> {
    let mut tally = Tally::default();
    for fact in facts.iter().filter(|f| window.contains(f.sale_date)) {
        tally.add(fact.sale_price)?;
    }
    Ok(tally)
}

/// Units and revenue for the target month, the month before, and the same
/// month a year earlier. Empty windows report zero.
pub fn period_comparison(
    facts: &[SaleFact],
    windows: &ComparisonWindows,
) -> AnalyticsResult<PeriodComparison> {
    let current = sum_window(facts, &windows.current)?;
    let prev_month = sum_window(facts, &windows.prev_month)?;
    let prev_year = sum_window(facts, &windows.prev_year)?;

    Ok(PeriodComparison {
        month:              windows.current.start,
        units:              current.units,
        revenue:            current.revenue,
        prev_month_units:   prev_month.units,
        prev_month_revenue: prev_month.revenue,
        prev_year_units:    prev_year.units,
        prev_year_revenue:  prev_year.revenue,
    })
}

/// Percent change from `previous` to `current`. `None` when `previous` is
/// zero or when the change does not fit in a decimal.
pub fn pct_change(current: Money, previous: Money) -> Option<f64> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(Money::ONE_HUNDRED)?
        .to_f64()
}

impl PeriodComparison {
    pub fn mom_units_pct(&self) -> Option<f64> {
        pct_change(Money::from(self.units), Money::from(self.prev_month_units))
    }

    pub fn mom_revenue_pct(&self) -> Option<f64> {
        pct_change(self.revenue, self.prev_month_revenue)
    }

    pub fn yoy_units_pct(&self) -> Option<f64> {
        pct_change(Money::from(self.units), Money::from(self.prev_year_units))
    }

    pub fn yoy_revenue_pct(&self) -> Option<f64> {
        pct_change(self.revenue, self.prev_year_revenue)
    }
}
