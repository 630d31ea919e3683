//! Unsold inventory: paged listing and age buckets as of a given day.

use crate::{
    fact::InventoryDwellFact,
    types::DealerId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsoldVehicle {
    pub vin:               String,
    pub dealer_id:         DealerId,
    pub dealer_name:       String,
    pub received_at:       NaiveDate,
    pub days_in_inventory: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingBucket {
    pub bucket: String,
    pub count:  i64,
}

/// Age bucket label for a number of days on the lot.
pub fn ageing_label(days: i64) -> &'static str {
    match days {
        i64::MIN..=30 => "0-30",
        31..=60 => "31-60",
        61..=90 => "61-90",
        _ => "90+",
    }
}

fn unsold<'a>(
    facts: &'a [InventoryDwellFact],
    dealer_id: Option<DealerId>,
) -> impl Iterator<Item = &'a InventoryDwellFact> + 'a {
    facts
        .iter()
        .filter(move |f| !f.is_sold() && dealer_id.map_or(true, |id| f.dealer_id == id))
}

/// One page of unsold vehicles, oldest stock first (VIN breaks ties).
///
/// `page` is 1-based; values below 1 are treated as 1. `page_size` must
/// already be clamped by the caller's limit policy.
pub fn unsold_vehicles(
    facts: &[InventoryDwellFact],
    as_of: NaiveDate,
    dealer_id: Option<DealerId>,
    page: i64,
    page_size: usize,
) -> Vec<UnsoldVehicle> {
    let mut rows: Vec<UnsoldVehicle> = unsold(facts, dealer_id)
        .map(|f| UnsoldVehicle {
            vin:               f.vin.clone(),
            dealer_id:         f.dealer_id,
            dealer_name:       f.dealer_name.clone(),
            received_at:       f.received_at,
            days_in_inventory: (as_of - f.received_at).num_days(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.days_in_inventory
            .cmp(&a.days_in_inventory)
            .then_with(|| a.vin.cmp(&b.vin))
    });

    let page = usize::try_from(page.max(1)).unwrap_or(1);
    let offset = (page - 1).saturating_mul(page_size);
    rows.into_iter().skip(offset).take(page_size).collect()
}

/// Count unsold vehicles per age bucket, ordered by bucket label. Buckets
/// with no vehicles are omitted.
pub fn ageing(
    facts: &[InventoryDwellFact],
    as_of: NaiveDate,
    dealer_id: Option<DealerId>,
) -> Vec<AgeingBucket> {
    let mut counts: BTreeMap<&'static str, i64> = BTreeMap::new();
    for fact in unsold(facts, dealer_id) {
        *counts
            .entry(ageing_label((as_of - fact.received_at).num_days()))
            .or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(bucket, count)| AgeingBucket { bucket: bucket.to_string(), count })
        .collect()
}
