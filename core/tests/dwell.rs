mod common;

use carco_core::{
    dwell,
    engine::AnalyticsEngine,
    fact::{InventoryDwellFact, SaleFact},
    query::{DwellOptions, QueryContext},
    source::MemoryFactSource,
};
use common::{d, dealer_sale, range, sold_dwell, unsold_dwell};
use rust_decimal_macros::dec;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Dwell rows plus the matching sales (same vehicle, dealer and date).
fn sold(rows: &[(i64, i64, u32, i64)]) -> (Vec<InventoryDwellFact>, Vec<SaleFact>) {
    let mut dwell = Vec::new();
    let mut sales = Vec::new();
    for &(vehicle, dealer, day, days) in rows {
        dwell.push(sold_dwell(vehicle, dealer, d(2024, 6, day), days));
        let mut s = dealer_sale(vehicle, d(2024, 6, day), dealer, dec!(1));
        s.vehicle_id = vehicle;
        sales.push(s);
    }
    (dwell, sales)
}

fn longest(
    dwell: Vec<InventoryDwellFact>,
    sales: Vec<SaleFact>,
    include_unsold: bool,
) -> Option<dwell::DwellSummary> {
    AnalyticsEngine::with_defaults(MemoryFactSource::new().with_dwell(dwell).with_sales(sales))
        .longest_dwell(
            &DwellOptions { range: range(d(2024, 6, 1), d(2024, 6, 30)), include_unsold },
            &QueryContext::new(),
        )
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Dealer 1 averages 15 days, dealer 2 averages 5.
#[test]
fn longest_average_wins() {
    let (dwell, sales) = sold(&[(1, 1, 10, 10), (2, 1, 11, 20), (3, 2, 12, 5)]);
    let best = longest(dwell, sales, false).unwrap();
    assert_eq!(best.dealer_id, 1);
    assert_eq!(best.dealer_name, "Dealer 1");
    assert_eq!(best.avg_days, 15.0);
    assert_eq!(best.sample_count, 2);
}

/// Equal averages go to the lowest dealer id.
#[test]
fn ties_go_to_lowest_dealer_id() {
    let (dwell, sales) = sold(&[(1, 9, 10, 12), (2, 4, 11, 12), (3, 6, 12, 12)]);
    assert_eq!(longest(dwell, sales, false).unwrap().dealer_id, 4);
}

/// include_unsold is accepted but changes nothing: unsold vehicles never
/// enter the average.
#[test]
fn include_unsold_is_a_no_op() {
    let (mut dwell, sales) = sold(&[(1, 1, 10, 10), (2, 2, 11, 8)]);
    dwell.push(unsold_dwell(50, 2, d(2023, 1, 1)));
    let with = longest(dwell.clone(), sales.clone(), true);
    let without = longest(dwell, sales, false);
    assert_eq!(with, without);
    assert_eq!(with.unwrap().dealer_id, 1);
}

/// Nothing sold in range means no result.
#[test]
fn empty_range_is_none() {
    let (dwell, sales) = sold(&[]);
    assert!(longest(dwell, sales, false).is_none());
}

/// Dwell rows without a matching sale are dropped from the average.
#[test]
fn rows_without_matching_sale_are_dropped() {
    let (mut dwell, sales) = sold(&[(1, 1, 10, 4)]);
    dwell.push(sold_dwell(99, 2, d(2024, 6, 15), 400));
    let per_dealer = dwell::dwell_by_dealer(&dwell, &sales, &range(d(2024, 6, 1), d(2024, 6, 30)));
    assert_eq!(per_dealer.len(), 1);
    assert_eq!(per_dealer[0].dealer_id, 1);
}

/// Only sales dated inside the range count; both ends are inclusive.
#[test]
fn dwell_range_is_inclusive() {
    let (dwell, sales) = sold(&[(1, 1, 1, 3), (2, 2, 30, 9)]);
    let per_dealer = dwell::dwell_by_dealer(&dwell, &sales, &range(d(2024, 6, 1), d(2024, 6, 30)));
    assert_eq!(per_dealer.len(), 2);
    let narrow = dwell::dwell_by_dealer(&dwell, &sales, &range(d(2024, 6, 2), d(2024, 6, 29)));
    assert!(narrow.is_empty());
}
