mod common;

use carco_core::{
    engine::AnalyticsEngine,
    error::AnalyticsError,
    fact::SaleFact,
    query::{QueryContext, RankMetric, TopOptions},
    ranking::{self, GroupKey, RankGroup},
    source::MemoryFactSource,
};
use common::{color_sale, d, dealer_sale, model_sale, range, sale};
use rust_decimal_macros::dec;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn engine(source: MemoryFactSource) -> AnalyticsEngine<MemoryFactSource> {
    AnalyticsEngine::with_defaults(source)
}

fn opts(metric: RankMetric, limit: Option<i64>) -> TopOptions {
    TopOptions {
        range: range(d(2024, 1, 1), d(2024, 12, 31)),
        metric,
        limit,
        brand: None,
    }
}

/// Five brands: brand N sells N units at 100 each, except brand 1 which
/// sells one very expensive unit.
fn brand_sales() -> Vec<SaleFact> {
    let mut sales = Vec::new();
    let mut id = 0;
    for brand in 1..=5 {
        for _ in 0..brand {
            id += 1;
            sales.push(sale(id, d(2024, 3, 1), brand, &format!("Brand{brand}"), dec!(100)));
        }
    }
    sales[0].sale_price = dec!(10000);
    sales
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Without a limit, top brands returns two rows.
#[test]
fn top_brands_defaults_to_two() {
    let rows = engine(MemoryFactSource::new().with_sales(brand_sales()))
        .top_brands(&opts(RankMetric::Units, None), &QueryContext::new())
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].brand_id, 5);
    assert_eq!(rows[0].units, 5);
    assert_eq!(rows[1].brand_id, 4);
}

/// Zero, negative and above-ceiling limits all fall back to the default.
#[test]
fn invalid_limits_fall_back_to_default() {
    let e = engine(MemoryFactSource::new().with_sales(brand_sales()));
    let ctx = QueryContext::new();
    for limit in [Some(0), Some(-5), Some(10_000)] {
        let rows = e.top_brands(&opts(RankMetric::Units, limit), &ctx).unwrap();
        assert_eq!(rows.len(), 2, "limit {limit:?}");
    }
    let rows = e.top_brands(&opts(RankMetric::Units, Some(50)), &ctx).unwrap();
    assert_eq!(rows.len(), 5);
}

/// Revenue ranking orders by summed price instead of count.
#[test]
fn top_brands_by_revenue() {
    let rows = engine(MemoryFactSource::new().with_sales(brand_sales()))
        .top_brands(&opts(RankMetric::Revenue, Some(1)), &QueryContext::new())
        .unwrap();
    assert_eq!(rows[0].brand_id, 1);
    assert_eq!(rows[0].revenue, dec!(10000));
}

/// Brands tied on the metric come out lowest id first.
#[test]
fn brand_ties_break_on_lowest_id() {
    let sales = vec![
        sale(1, d(2024, 1, 1), 9, "Nine", dec!(5)),
        sale(2, d(2024, 1, 1), 3, "Three", dec!(5)),
        sale(3, d(2024, 1, 1), 7, "Seven", dec!(5)),
    ];
    let rows = ranking::top_brands(&sales, &range(d(2024, 1, 1), d(2024, 1, 31)), RankMetric::Units, 3).unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.brand_id).collect();
    assert_eq!(ids, vec![3, 7, 9]);
}

/// Model rankings use units, then revenue, whatever the metric.
#[test]
fn top_models_units_then_revenue() {
    let sales = vec![
        model_sale(1, d(2024, 2, 1), "Cheap", dec!(100)),
        model_sale(2, d(2024, 2, 1), "Cheap", dec!(100)),
        model_sale(3, d(2024, 2, 1), "Dear", dec!(900)),
        model_sale(4, d(2024, 2, 1), "Dear", dec!(900)),
        model_sale(5, d(2024, 2, 1), "Solo", dec!(99999)),
    ];
    let rows = engine(MemoryFactSource::new().with_sales(sales))
        .top_models(&opts(RankMetric::Revenue, None), &QueryContext::new())
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.model_name.as_str()).collect();
    assert_eq!(names, vec!["Dear", "Cheap", "Solo"]);
}

/// A brand filter keeps only that brand's models.
#[test]
fn top_models_by_brand() {
    let mut sales = vec![
        model_sale(1, d(2024, 2, 1), "H6", dec!(1)),
        model_sale(2, d(2024, 2, 1), "H6", dec!(1)),
    ];
    let mut other = sale(3, d(2024, 2, 1), 2, "Other", dec!(1));
    other.model_name = "Z1".into();
    sales.push(other.clone());
    sales.push(SaleFact { sale_id: 4, ..other });

    let mut o = opts(RankMetric::Units, None);
    o.brand = Some("Other".into());
    let rows = engine(MemoryFactSource::new().with_sales(sales))
        .top_models(&o, &QueryContext::new())
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].model_name, "Z1");
    assert_eq!(rows[0].units, 2);
}

/// A blank brand filter is rejected.
#[test]
fn top_models_rejects_blank_brand() {
    let mut o = opts(RankMetric::Units, None);
    o.brand = Some("  ".into());
    let err = engine(MemoryFactSource::new())
        .top_models(&o, &QueryContext::new())
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidArgument { name: "brand", .. }));
}

/// Dealer ranking respects its limit and metric.
#[test]
fn top_dealers_by_units() {
    let mut sales = Vec::new();
    for (i, dealer) in [1, 2, 2, 3, 3, 3].into_iter().enumerate() {
        sales.push(dealer_sale(i as i64 + 1, d(2024, 4, 1), dealer, dec!(10)));
    }
    let rows = engine(MemoryFactSource::new().with_sales(sales))
        .top_dealers(&opts(RankMetric::Units, Some(2)), &QueryContext::new())
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].dealer_id, 3);
    assert_eq!(rows[0].dealer_name, "Dealer 3");
    assert_eq!(rows[0].units, 3);
    assert_eq!(rows[1].dealer_id, 2);
}

/// Colors resolve through the catalog; unknown colors are dropped.
#[test]
fn top_colors_resolve_names_and_drop_unknown() {
    let sales = vec![
        color_sale(1, d(2024, 5, 1), 7),
        color_sale(2, d(2024, 5, 1), 7),
        color_sale(3, d(2024, 5, 1), 7),
        color_sale(4, d(2024, 5, 1), 2),
        color_sale(5, d(2024, 5, 1), 2),
        color_sale(6, d(2024, 5, 1), 4),
    ];
    let source = MemoryFactSource::new()
        .with_sales(sales)
        .with_color(2, "Black")
        .with_color(4, "Red");
    let rows = engine(source)
        .top_colors(&opts(RankMetric::Revenue, None), &QueryContext::new())
        .unwrap();
    let got: Vec<(&str, i64)> = rows.iter().map(|r| (r.color_name.as_str(), r.units)).collect();
    assert_eq!(got, vec![("Black", 2), ("Red", 1)]);
}

/// The generic ranking groups by the requested key and omits revenue for
/// colors.
#[test]
fn top_n_generic_groups() {
    let sales = brand_sales();
    let r = range(d(2024, 1, 1), d(2024, 12, 31));

    let brands = ranking::top_n(&sales, &r, 3, RankMetric::Units, RankGroup::Brand).unwrap();
    assert_eq!(brands.len(), 3);
    assert_eq!(brands[0].key, GroupKey::Brand { id: 5, name: "Brand5".into() });
    assert_eq!(brands[0].revenue, Some(dec!(500)));

    let colors = ranking::top_n(&sales, &r, 10, RankMetric::Revenue, RankGroup::Color).unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].units, 15);
    assert_eq!(colors[0].revenue, None);
}

/// Sales outside the range never count toward a ranking.
#[test]
fn rankings_ignore_out_of_range_sales() {
    let sales = vec![
        sale(1, d(2023, 12, 31), 1, "Old", dec!(1)),
        sale(2, d(2023, 12, 31), 1, "Old", dec!(1)),
        sale(3, d(2024, 1, 1), 2, "New", dec!(1)),
    ];
    let rows = engine(MemoryFactSource::new().with_sales(sales))
        .top_brands(&opts(RankMetric::Units, None), &QueryContext::new())
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].brand_name, "New");
}

/// Dealer revenue past the decimal range fails the ranking.
#[test]
fn dealer_revenue_overflow_is_an_error() {
    let sales = vec![
        dealer_sale(1, d(2024, 4, 1), 3, rust_decimal::Decimal::MAX),
        dealer_sale(2, d(2024, 4, 2), 3, rust_decimal::Decimal::MAX),
    ];
    let err = engine(MemoryFactSource::new().with_sales(sales))
        .top_dealers(&opts(RankMetric::Revenue, None), &QueryContext::new())
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Overflow { what: "revenue" }));
}
