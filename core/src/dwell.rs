//! Dealer dwell time: average days a sold vehicle sat in a dealer's
//! inventory before sale.

use crate::{
    fact::{InventoryDwellFact, SaleFact},
    query::DateRange,
    types::{DealerId, VehicleId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellSummary {
    pub dealer_id:    DealerId,
    pub dealer_name:  String,
    pub avg_days:     f64,
    pub sample_count: i64,
}

/// Per-dealer average dwell for vehicles sold in `range`, in dealer id
/// order.
///
/// Dwell comes from the precomputed `days_in_inventory`. The join to
/// `sales` only supplies the dealer display name; dwell rows with no
/// matching sale are dropped.
pub fn dwell_by_dealer(
    dwell: &[InventoryDwellFact],
    sales: &[SaleFact],
    range: &DateRange,
) -> Vec<DwellSummary> {
    let mut dealer_names: HashMap<VehicleId, &str> = HashMap::new();
    for sale in sales {
        dealer_names.entry(sale.vehicle_id).or_insert(&sale.dealer_name);
    }

    let mut groups: BTreeMap<(DealerId, &str), (i64, i64)> = BTreeMap::new();
    for fact in dwell {
        let (Some(sale_date), Some(days)) = (fact.sale_date, fact.days_in_inventory) else {
            continue;
        };
        if !range.contains(sale_date) {
            continue;
        }
        let Some(name) = dealer_names.get(&fact.vehicle_id) else {
            continue;
        };
        let entry = groups.entry((fact.dealer_id, *name)).or_insert((0, 0));
        entry.0 += days;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((dealer_id, name), (total_days, count))| DwellSummary {
            dealer_id,
            dealer_name: name.to_string(),
            // count >= 1: a group only exists once a row was added
            avg_days: total_days as f64 / count as f64,
            sample_count: count,
        })
        .collect()
}

/// The dealer with the longest average dwell for vehicles sold in `range`.
///
/// Ties go to the lowest dealer id. `include_unsold` is accepted but has no
/// effect: unsold vehicles have no dwell figure, so only sold vehicles are
/// ever averaged.
pub fn longest_dwell(
    dwell: &[InventoryDwellFact],
    sales: &[SaleFact],
    range: &DateRange,
    include_unsold: bool,
) -> Option<DwellSummary> {
    if include_unsold {
        log::warn!("longest dwell: include_unsold has no effect, averaging sold vehicles only");
    }

    let mut best: Option<DwellSummary> = None;
    for summary in dwell_by_dealer(dwell, sales, range) {
        let better = match &best {
            None => true,
            Some(b) => summary.avg_days > b.avg_days,
        };
        if better {
            best = Some(summary);
        }
    }
    best
}
