//! Deterministic demo dataset.
//!
//! RULES:
//!   - Same `DemoOptions` ⇒ identical rows, ids included, on a fresh store.
//!   - All randomness comes from `SeedStage` streams off the master seed.
//!   - Everything is written in one transaction; a failure leaves no rows.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    fact::Gender,
    name_generator::NameGenerator,
    rng::{SeedRng, SeedStage},
    store::FactStore,
    types::{CustomerId, DealerId, ModelId, Money, PartSpecId, SupplierId},
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoOptions {
    pub seed:      u64,
    pub vehicles:  usize,
    pub customers: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self { seed: 42, vehicles: 1200, customers: 600 }
    }
}

/// Row counts written by one `seed` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSummary {
    pub customers:          usize,
    pub transmission_units: usize,
    pub vehicles:           usize,
    pub sales:              usize,
}

// ── Catalog ─────────────────────────────────────────────────────────────────

struct SpecDef {
    code:     &'static str,
    name:     &'static str,
    supplier: &'static str,
    serial:   &'static str,
}

const SUPPLIERS: &[&str] = &["Aisin", "ZF", "Getrag"];

const SPECS: &[SpecDef] = &[
    SpecDef { code: "AISIN_6AT",   name: "Aisin 6AT",   supplier: "Aisin",  serial: "AIS6AT" },
    SpecDef { code: "AISIN_8AT",   name: "Aisin 8AT",   supplier: "Aisin",  serial: "AIS8AT" },
    SpecDef { code: "ZF_8HP",      name: "ZF 8HP",      supplier: "ZF",     serial: "ZF8HP" },
    SpecDef { code: "GETRAG_7DCT", name: "Getrag 7DCT", supplier: "Getrag", serial: "GET7DCT" },
];

/// (brand, sell multiplier, [(model, spec code, base price)]).
const BRANDS: &[(&str, f64, &[(&str, &str, i64)])] = &[
    ("BYD", 1.15, &[
        ("Song Pro", "GETRAG_7DCT", 139_800),
        ("Qin PLUS", "GETRAG_7DCT", 129_800),
        ("Tang DM-i", "GETRAG_7DCT", 259_800),
    ]),
    ("Great Wall", 1.05, &[
        ("Haval H4", "AISIN_6AT", 109_800),
        ("Haval H6", "AISIN_6AT", 129_800),
        ("Tank 300", "ZF_8HP", 259_800),
    ]),
    ("Geely", 1.05, &[
        ("Boyue", "AISIN_6AT", 125_800),
        ("Xingrui", "AISIN_8AT", 145_800),
    ]),
    ("Chery", 0.95, &[
        ("Tiggo 8", "GETRAG_7DCT", 122_800),
        ("Arrizo 8", "GETRAG_7DCT", 120_800),
    ]),
    ("Changan", 1.05, &[
        ("CS75 PLUS", "AISIN_8AT", 135_800),
        ("UNI-K", "AISIN_8AT", 175_800),
    ]),
    ("Roewe", 0.98, &[
        ("RX5", "AISIN_6AT", 129_800),
        ("i5", "GETRAG_7DCT", 89_800),
    ]),
    ("Trumpchi", 1.00, &[
        ("GS4", "GETRAG_7DCT", 119_800),
        ("GS8", "AISIN_8AT", 229_800),
    ]),
];

/// Per-model sell multipliers; unlisted models use 1.0.
const MODEL_SELL_BOOST: &[(&str, f64)] = &[
    ("Haval H4", 1.6),
    ("Haval H6", 1.2),
    ("Tank 300", 0.8),
    ("GS8", 0.85),
    ("Tang DM-i", 0.9),
];

const COLORS: &[&str] = &[
    "White", "Black", "Silver", "Red", "Blue", "Grey", "Orange", "Green", "Brown",
    "Pearl White", "Titanium Grey",
];

/// (name, city, province, speed). Speed below 1.0 sells faster.
const DEALERS: &[(&str, &str, &str, f64)] = &[
    ("Beijing Guomao", "Beijing", "Beijing", 1.00),
    ("Beijing Wangjing", "Beijing", "Beijing", 1.05),
    ("Shanghai Pudong", "Shanghai", "Shanghai", 0.85),
    ("Shanghai Xuhui", "Shanghai", "Shanghai", 0.95),
    ("Guangzhou Tianhe", "Guangzhou", "Guangdong", 0.95),
    ("Shenzhen Nanshan", "Shenzhen", "Guangdong", 0.90),
    ("Hangzhou Binjiang", "Hangzhou", "Zhejiang", 0.98),
    ("Nanjing Xinjiekou", "Nanjing", "Jiangsu", 1.00),
    ("Chengdu Gaoxin", "Chengdu", "Sichuan", 1.05),
    ("Chongqing Yubei", "Chongqing", "Chongqing", 1.20),
    ("Wuhan Guanggu", "Wuhan", "Hubei", 1.05),
    ("Xi'an Gaoxin", "Xi'an", "Shaanxi", 1.00),
];

const CUSTOMER_CITIES: &[&str] = &[
    "Beijing", "Shanghai", "Guangzhou", "Shenzhen", "Chengdu", "Chongqing", "Hangzhou",
    "Wuhan", "Nanjing", "Xi'an", "Hefei", "Qingdao",
];

/// Annual income bands in units of 10,000 and their relative weights.
const INCOME_BANDS: &[i64] = &[6, 8, 10, 12, 15, 20, 25, 30, 40, 50, 80];
const INCOME_WEIGHTS: &[f64] = &[2.0, 5.0, 8.0, 10.0, 10.0, 8.0, 6.0, 4.0, 3.0, 2.0, 1.0];

/// Relative sale volume per calendar month (index 0 = January).
const MONTH_WEIGHTS: [f64; 12] = [0.8, 0.7, 1.0, 1.1, 1.2, 1.3, 1.0, 0.9, 1.5, 1.4, 1.1, 1.3];

const VIN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ0123456789";
const SERIAL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn ymd(year: i32, month: u32, day: u32) -> AnalyticsResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| AnalyticsError::InvalidArgument {
        name: "date",
        reason: format!("{year}-{month}-{day} is not a calendar date"),
    })
}

fn plus_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_days(Days::new(days.max(0) as u64)).unwrap_or(date)
}

fn random_code(rng: &mut SeedRng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[rng.index(alphabet.len())]))
        .collect()
}

struct ModelRow {
    id:         ModelId,
    name:       &'static str,
    spec:       PartSpecId,
    base_price: i64,
    sell_mult:  f64,
}

struct Catalog {
    models:   Vec<ModelRow>,
    colors:   Vec<i64>,
    dealers:  Vec<(DealerId, f64)>,
    specs:    Vec<(PartSpecId, SupplierId, &'static str, &'static str)>,
}

fn seed_catalog(store: &FactStore) -> AnalyticsResult<Catalog> {
    let mut suppliers: HashMap<&str, SupplierId> = HashMap::new();
    for name in SUPPLIERS.iter().copied() {
        suppliers.insert(name, store.insert_supplier(name)?);
    }

    let mut specs = Vec::with_capacity(SPECS.len());
    let mut spec_ids: HashMap<&str, PartSpecId> = HashMap::new();
    for spec in SPECS {
        let id = store.insert_part_spec("Transmission", spec.name, spec.code)?;
        let supplier = suppliers.get(spec.supplier).copied().ok_or_else(|| {
            AnalyticsError::InvalidArgument {
                name: "supplier",
                reason: format!("unknown supplier {}", spec.supplier),
            }
        })?;
        spec_ids.insert(spec.code, id);
        specs.push((id, supplier, spec.supplier, spec.serial));
    }

    let mut models = Vec::new();
    for (brand, brand_mult, brand_models) in BRANDS {
        let brand_id = store.insert_brand(brand)?;
        for (name, code, price) in brand_models.iter() {
            let spec = spec_ids.get(code).copied().ok_or_else(|| {
                AnalyticsError::InvalidArgument {
                    name: "spec_code",
                    reason: format!("unknown transmission spec {code}"),
                }
            })?;
            let boost = MODEL_SELL_BOOST
                .iter()
                .find(|(m, _)| m == name)
                .map_or(1.0, |(_, b)| *b);
            models.push(ModelRow {
                id: store.insert_model(brand_id, name)?,
                name: *name,
                spec,
                base_price: *price,
                sell_mult: brand_mult * boost,
            });
        }
    }

    let colors = COLORS
        .iter()
        .map(|c| store.insert_color(c))
        .collect::<AnalyticsResult<Vec<_>>>()?;

    let dealers = DEALERS
        .iter()
        .map(|(name, city, province, speed)| {
            store.insert_dealer(name, city, province).map(|id| (id, *speed))
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    Ok(Catalog { models, colors, dealers, specs })
}

fn seed_customers(
    store: &FactStore,
    rng: &mut SeedRng,
    count: usize,
) -> AnalyticsResult<Vec<CustomerId>> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let name = NameGenerator::generate_full_name(rng);
        let gender = if rng.chance(0.55) { Gender::Male } else { Gender::Female };
        let band = INCOME_BANDS[rng.weighted(INCOME_WEIGHTS)];
        let city = CUSTOMER_CITIES[rng.index(CUSTOMER_CITIES.len())];
        ids.push(store.insert_customer(&name, gender, Some(Money::from(band * 10_000)), Some(city))?);
    }
    Ok(ids)
}

/// Transmission unit pools keyed by part spec. Aisin production is biased
/// into May-August 2024 so recall windows there have plenty of hits.
fn seed_transmissions(
    store: &FactStore,
    rng: &mut SeedRng,
    catalog: &Catalog,
    vehicles: usize,
) -> AnalyticsResult<HashMap<PartSpecId, Vec<i64>>> {
    let spread_start = ymd(2023, 1, 1)?;
    let spread_days = (ymd(2025, 10, 31)? - spread_start).num_days();
    let recall_start = ymd(2024, 5, 1)?;

    let total = vehicles + vehicles * 3 / 10;
    let base = (total / catalog.specs.len().max(1)).max(50);

    let mut pools: HashMap<PartSpecId, Vec<i64>> = HashMap::new();
    for (spec_id, supplier_id, supplier_name, prefix) in &catalog.specs {
        let is_aisin = *supplier_name == "Aisin";
        let count = if is_aisin { base * 13 / 10 } else { base };
        let pool = pools.entry(*spec_id).or_default();
        for _ in 0..count {
            let produced = if is_aisin && rng.chance(0.65) {
                plus_days(recall_start, rng.between(0, 122))
            } else {
                plus_days(spread_start, rng.between(0, spread_days))
            };
            let serial = format!("{}-{}", prefix, random_code(rng, SERIAL_ALPHABET, 10));
            pool.push(store.insert_transmission_unit(*spec_id, *supplier_id, &serial, produced)?);
        }
    }
    Ok(pools)
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Pick a sale date within 150 days of receipt, weighted by calendar month,
/// with slower dealers pushing the fallback delay out.
fn choose_sale_date(
    rng: &mut SeedRng,
    received_at: NaiveDate,
    model_name: &str,
    speed: f64,
    horizon: NaiveDate,
) -> NaiveDate {
    let earliest = plus_days(received_at, 1);
    let latest = plus_days(received_at, 150).min(horizon);
    let delay = ((rng.triangular(5.0, 120.0, 35.0) * speed) as i64).clamp(1, 150);

    let first_month = earliest.with_day(1).unwrap_or(earliest);
    let months: Vec<NaiveDate> = (0..6)
        .filter_map(|i| first_month.checked_add_months(Months::new(i)))
        .collect();
    let weights: Vec<f64> = months
        .iter()
        .map(|m| {
            let w = MONTH_WEIGHTS[m.month0() as usize];
            if model_name == "Haval H4" && m.year() == 2024 && m.month() == 6 {
                w * 2.5
            } else {
                w
            }
        })
        .collect();
    let month = months.get(rng.weighted(&weights)).copied().unwrap_or(first_month);
    let day = rng.between(1, i64::from(last_day_of_month(month).day()));
    let mut sale_date = month.with_day(day as u32).unwrap_or(month);

    if sale_date <= earliest {
        sale_date = plus_days(earliest, delay);
    }
    sale_date.min(latest)
}

fn seed_vehicles(
    store: &FactStore,
    opts: &DemoOptions,
    catalog: &Catalog,
    customers: &[CustomerId],
    pools: &mut HashMap<PartSpecId, Vec<i64>>,
    summary: &mut DemoSummary,
) -> AnalyticsResult<()> {
    let mut rng = SeedStage::Vehicles.rng(opts.seed);
    let mut sales_rng = SeedStage::Sales.rng(opts.seed);
    let made_start = ymd(2023, 1, 1)?;
    let made_days = (ymd(2025, 10, 31)? - made_start).num_days();
    let horizon = ymd(2025, 12, 31)?;

    for _ in 0..opts.vehicles {
        let model = &catalog.models[rng.index(catalog.models.len())];
        let unit = match pools.get_mut(&model.spec).and_then(Vec::pop) {
            Some(unit) => unit,
            None => {
                let (_, supplier, _, _) = catalog
                    .specs
                    .iter()
                    .find(|(id, ..)| *id == model.spec)
                    .copied()
                    .ok_or_else(|| AnalyticsError::InvalidArgument {
                        name: "part_spec_id",
                        reason: format!("no supplier for spec {}", model.spec),
                    })?;
                let serial = format!("ADHOC-{}", random_code(&mut rng, SERIAL_ALPHABET, 10));
                let produced = plus_days(ymd(2024, 1, 1)?, rng.between(0, 300));
                summary.transmission_units += 1;
                store.insert_transmission_unit(model.spec, supplier, &serial, produced)?
            }
        };

        let vin = random_code(&mut rng, VIN_ALPHABET, 17);
        let color = catalog.colors[rng.index(catalog.colors.len())];
        let made = plus_days(made_start, rng.between(0, made_days));
        let vehicle_id = store.insert_vehicle(&vin, model.id, color, unit, made)?;
        summary.vehicles += 1;

        let (dealer_id, speed) = catalog.dealers[rng.index(catalog.dealers.len())];
        let received_at = plus_days(made, rng.between(0, 30));
        store.insert_inventory_assignment(vehicle_id, dealer_id, received_at)?;

        let sold_prob = (0.75 * model.sell_mult).min(0.95);
        if !sales_rng.chance(sold_prob) || customers.is_empty() {
            continue;
        }
        let customer = customers[sales_rng.index(customers.len())];
        let sale_date = choose_sale_date(&mut sales_rng, received_at, model.name, speed, horizon);
        let mut price = model.base_price as f64 * sales_rng.uniform(0.9, 1.1);
        if sales_rng.chance(0.15) {
            price *= 1.2;
        }
        let price = Money::from((price / 100.0).round() as i64 * 100);
        store.insert_sale(vehicle_id, dealer_id, customer, sale_date, price)?;
        summary.sales += 1;
    }
    Ok(())
}

/// Populate a migrated, empty store with the demo dataset.
pub fn seed(store: &FactStore, opts: &DemoOptions) -> AnalyticsResult<DemoSummary> {
    log::info!(
        "seeding demo data: seed={} vehicles={} customers={}",
        opts.seed,
        opts.vehicles,
        opts.customers
    );
    let summary = store.in_transaction(|store| {
        let mut summary = DemoSummary::default();
        let catalog = seed_catalog(store)?;

        let mut customer_rng = SeedStage::Customers.rng(opts.seed);
        let customers = seed_customers(store, &mut customer_rng, opts.customers)?;
        summary.customers = customers.len();

        let mut unit_rng = SeedStage::Transmissions.rng(opts.seed);
        let mut pools = seed_transmissions(store, &mut unit_rng, &catalog, opts.vehicles)?;
        summary.transmission_units = pools.values().map(Vec::len).sum();

        seed_vehicles(store, opts, &catalog, &customers, &mut pools, &mut summary)?;
        Ok(summary)
    })?;
    log::info!(
        "demo data ready: {} vehicles, {} sales, {} customers",
        summary.vehicles,
        summary.sales,
        summary.customers
    );
    Ok(summary)
}
