//! Query descriptors shared by the engine and the fact sources.
//!
//! Every report takes one immutable options record so validation lives in
//! one place: ranges are checked here, before any fact source is touched.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ── Date range ──────────────────────────────────────────────────────────────

/// Closed calendar range `[start, end]`. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnalyticsResult<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Re-check a range built field by field instead of through `new`.
    pub fn validate(&self) -> AnalyticsResult<()> {
        Self::new(self.start, self.end).map(|_| ())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Half-open calendar range `[start, end)`, used for period comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfOpenRange {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

impl HalfOpenRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Reject blank names before they reach a filter.
pub(crate) fn require_name(name: &'static str, value: &str) -> AnalyticsResult<()> {
    if value.trim().is_empty() {
        return Err(AnalyticsError::InvalidArgument {
            name,
            reason: "must not be blank".into(),
        });
    }
    Ok(())
}

// ── Ranking ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    Units,
    Revenue,
}

impl RankMetric {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "units" => Some(RankMetric::Units),
            "revenue" => Some(RankMetric::Revenue),
            _ => None,
        }
    }
}

// ── Per-report option records ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendOptions {
    pub range:   DateRange,
    pub segment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopOptions {
    pub range:    DateRange,
    pub metric:   RankMetric,
    /// Raw caller limit; clamped by the report's `LimitPolicy`.
    pub limit:    Option<i64>,
    /// Exact brand name; only honoured by model rankings.
    pub brand:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceOptions {
    pub range: DateRange,
    pub brand: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DwellOptions {
    pub range:          DateRange,
    /// Accepted but has no effect: only sold vehicles carry a dwell figure.
    pub include_unsold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallOptions {
    pub supplier:    String,
    pub range:       DateRange,
    pub unsold_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsoldOptions {
    pub as_of:     NaiveDate,
    pub dealer_id: Option<i64>,
    pub page:      i64,
    pub page_size: Option<i64>,
}

// ── Fact-source pre-filters ─────────────────────────────────────────────────
//
// Sources may use these to narrow their reads. The engine re-applies every
// filter, so a source that ignores them still yields correct reports.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleQuery {
    pub range: Option<DateRange>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DwellQuery {
    /// Restrict to sold rows whose sale date falls in the range.
    pub sold_in:     Option<DateRange>,
    pub unsold_only: bool,
    pub dealer_id:   Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallQuery {
    pub supplier:   Option<String>,
    pub produced_in: Option<DateRange>,
}

// ── Cancellation ────────────────────────────────────────────────────────────

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-call cancellation and deadline, propagated from the caller down to
/// the fact source read.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancel:   CancelToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Fail fast if the caller gave up. Sources call this while reading.
    pub fn check(&self) -> AnalyticsResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AnalyticsError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AnalyticsError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
