//! Transmission recall lookups: affected units by VIN, and sold/unsold
//! exposure per model.

use crate::{
    fact::TransmissionInstallFact,
    query::DateRange,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallHit {
    pub vin:             String,
    pub serial_number:   String,
    pub production_date: NaiveDate,
    pub customer_name:   Option<String>,
    pub sale_date:       Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallByModel {
    pub model_name: String,
    pub sold:       i64,
    pub unsold:     i64,
    pub total:      i64,
}

fn affected<'a>(
    installs: &'a [TransmissionInstallFact],
    supplier: &'a str,
    range: &'a DateRange,
) -> impl Iterator<Item = &'a TransmissionInstallFact> + 'a {
    installs
        .iter()
        .filter(move |i| i.supplier_name == supplier && range.contains(i.production_date))
}

/// One row per affected unit, ascending by VIN (serial breaks ties).
///
/// With `unsold_only`, sold units are excluded and customer/sale fields are
/// always blank, even if the source supplied them.
pub fn recall_hits(
    installs: &[TransmissionInstallFact],
    supplier: &str,
    range: &DateRange,
    unsold_only: bool,
) -> Vec<RecallHit> {
    let mut hits: Vec<RecallHit> = affected(installs, supplier, range)
        .filter(|i| !unsold_only || !i.is_sold())
        .map(|i| RecallHit {
            vin:             i.vin.clone(),
            serial_number:   i.serial_number.clone(),
            production_date: i.production_date,
            customer_name:   if unsold_only { None } else { i.customer_name.clone() },
            sale_date:       if unsold_only { None } else { i.sale_date },
        })
        .collect();
    hits.sort_by(|a, b| a.vin.cmp(&b.vin).then_with(|| a.serial_number.cmp(&b.serial_number)));
    hits
}

/// Affected units per model split into sold and unsold, largest total
/// first (model name breaks ties).
pub fn recall_by_model(
    installs: &[TransmissionInstallFact],
    supplier: &str,
    range: &DateRange,
) -> Vec<RecallByModel> {
    let mut groups: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for install in affected(installs, supplier, range) {
        let entry = groups.entry(install.model_name.as_str()).or_insert((0, 0));
        if install.is_sold() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<RecallByModel> = groups
        .into_iter()
        .map(|(model, (sold, unsold))| RecallByModel {
            model_name: model.to_string(),
            sold,
            unsold,
            total: sold + unsold,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}
