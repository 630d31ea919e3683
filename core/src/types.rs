//! Shared primitive types used across the analytics engine.

use rust_decimal::Decimal;

pub type BrandId = i64;
pub type ModelId = i64;
pub type ColorId = i64;
pub type DealerId = i64;
pub type CustomerId = i64;
pub type VehicleId = i64;
pub type SaleId = i64;
pub type SupplierId = i64;
pub type PartSpecId = i64;

/// Money in local currency units. Never a float: revenue sums must be exact.
pub type Money = Decimal;
