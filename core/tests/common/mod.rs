//! Fact builders shared by the integration tests.
#![allow(dead_code)]

use carco_core::{
    fact::{Gender, InventoryDwellFact, SaleFact, TransmissionInstallFact},
    query::DateRange,
    types::Money,
};
use chrono::NaiveDate;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

/// A sale with neutral defaults; tests override what they care about.
pub fn sale(id: i64, date: NaiveDate, brand_id: i64, brand: &str, price: Money) -> SaleFact {
    SaleFact {
        sale_id:         id,
        sale_date:       date,
        sale_price:      price,
        vehicle_id:      id,
        model_id:        brand_id * 100,
        model_name:      format!("{brand} Base"),
        brand_id,
        brand_name:      brand.to_string(),
        color_id:        1,
        customer_id:     id,
        customer_gender: Gender::Male,
        customer_income: None,
        dealer_id:       1,
        dealer_name:     "Dealer 1".to_string(),
    }
}

pub fn model_sale(id: i64, date: NaiveDate, model: &str, price: Money) -> SaleFact {
    SaleFact { model_name: model.to_string(), ..sale(id, date, 1, "Acme", price) }
}

pub fn dealer_sale(id: i64, date: NaiveDate, dealer_id: i64, price: Money) -> SaleFact {
    SaleFact {
        dealer_id,
        dealer_name: format!("Dealer {dealer_id}"),
        ..sale(id, date, 1, "Acme", price)
    }
}

pub fn color_sale(id: i64, date: NaiveDate, color_id: i64) -> SaleFact {
    SaleFact { color_id, ..sale(id, date, 1, "Acme", Money::ONE) }
}

/// A sold dwell row. `vehicle_id` should match a sale for the dealer name
/// join to succeed.
pub fn sold_dwell(vehicle_id: i64, dealer_id: i64, sale_date: NaiveDate, days: i64) -> InventoryDwellFact {
    InventoryDwellFact {
        dealer_id,
        dealer_name:       format!("Dealer {dealer_id}"),
        vehicle_id,
        vin:               format!("VIN{vehicle_id:05}"),
        received_at:       sale_date - chrono::Days::new(days as u64),
        sale_date:         Some(sale_date),
        days_in_inventory: Some(days),
    }
}

pub fn unsold_dwell(vehicle_id: i64, dealer_id: i64, received_at: NaiveDate) -> InventoryDwellFact {
    InventoryDwellFact {
        dealer_id,
        dealer_name:       format!("Dealer {dealer_id}"),
        vehicle_id,
        vin:               format!("VIN{vehicle_id:05}"),
        received_at,
        sale_date:         None,
        days_in_inventory: None,
    }
}

pub fn install(
    vehicle_id: i64,
    vin: &str,
    model: &str,
    supplier: &str,
    produced: NaiveDate,
    sold_on: Option<NaiveDate>,
) -> TransmissionInstallFact {
    TransmissionInstallFact {
        vehicle_id,
        vin:             vin.to_string(),
        model_name:      model.to_string(),
        serial_number:   format!("SN-{vehicle_id}"),
        production_date: produced,
        supplier_id:     1,
        supplier_name:   supplier.to_string(),
        part_spec_id:    1,
        part_spec_name:  "6AT".to_string(),
        sale_id:         sold_on.map(|_| vehicle_id),
        sale_date:       sold_on,
        customer_name:   sold_on.map(|_| format!("Customer {vehicle_id}")),
    }
}
