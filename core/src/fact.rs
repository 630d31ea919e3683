//! Fact rows supplied by the fact source.
//!
//! Facts are read-only snapshots. The engine never mutates or caches them;
//! every aggregate is rebuilt from a fresh read.

use crate::types::{
    BrandId, ColorId, CustomerId, DealerId, ModelId, Money, PartSpecId, SaleId, SupplierId,
    VehicleId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer gender as recorded at sale time.
///
/// Variant order follows the stored codes ("F" < "M" < "Unknown") so that
/// sorting by the enum matches sorting by the stored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::Unknown => "Unknown",
        }
    }

    /// Parse a stored gender code. Anything unrecognised is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "F" | "f" | "Female" => Gender::Female,
            "M" | "m" | "Male" => Gender::Male,
            _ => Gender::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One sale, denormalized with brand/model/dealer/customer attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleFact {
    pub sale_id:         SaleId,
    pub sale_date:       NaiveDate,
    pub sale_price:      Money,
    pub vehicle_id:      VehicleId,
    pub model_id:        ModelId,
    pub model_name:      String,
    pub brand_id:        BrandId,
    pub brand_name:      String,
    pub color_id:        ColorId,
    pub customer_id:     CustomerId,
    pub customer_gender: Gender,
    pub customer_income: Option<Money>,
    pub dealer_id:       DealerId,
    pub dealer_name:     String,
}

/// One vehicle placed at a dealer, with its sale linkage when sold.
///
/// `days_in_inventory` is precomputed by the source as
/// `sale_date - received_at` and is present exactly when `sale_date` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDwellFact {
    pub dealer_id:         DealerId,
    pub dealer_name:       String,
    pub vehicle_id:        VehicleId,
    pub vin:               String,
    pub received_at:       NaiveDate,
    pub sale_date:         Option<NaiveDate>,
    pub days_in_inventory: Option<i64>,
}

impl InventoryDwellFact {
    pub fn is_sold(&self) -> bool {
        self.sale_date.is_some()
    }
}

/// One installed transmission unit, with its sale linkage when sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionInstallFact {
    pub vehicle_id:      VehicleId,
    pub vin:             String,
    pub model_name:      String,
    pub serial_number:   String,
    pub production_date: NaiveDate,
    pub supplier_id:     SupplierId,
    pub supplier_name:   String,
    pub part_spec_id:    PartSpecId,
    pub part_spec_name:  String,
    pub sale_id:         Option<SaleId>,
    pub sale_date:       Option<NaiveDate>,
    pub customer_name:   Option<String>,
}

impl TransmissionInstallFact {
    pub fn is_sold(&self) -> bool {
        self.sale_id.is_some()
    }
}
