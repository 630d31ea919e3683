mod common;

use carco_core::{
    engine::AnalyticsEngine,
    error::AnalyticsError,
    fact::SaleFact,
    price::{self, percentile_cont, PriceSummary},
    query::{PriceOptions, QueryContext},
    source::MemoryFactSource,
    types::Money,
};
use common::{d, model_sale, range, sale};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn summarize(sales: Vec<SaleFact>, brand: Option<&str>, model: Option<&str>) -> PriceSummary {
    AnalyticsEngine::with_defaults(MemoryFactSource::new().with_sales(sales))
        .price_summary(
            &PriceOptions {
                range: range(d(2024, 3, 1), d(2024, 3, 31)),
                brand: brand.map(str::to_string),
                model: model.map(str::to_string),
            },
            &QueryContext::new(),
        )
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Three prices 10, 20, 30 interpolate to p95 = 29.
#[test]
fn three_sale_summary() {
    let sales = vec![
        sale(1, d(2024, 3, 3), 1, "Acme", dec!(30)),
        sale(2, d(2024, 3, 1), 1, "Acme", dec!(10)),
        sale(3, d(2024, 3, 31), 1, "Acme", dec!(20)),
    ];
    let s = summarize(sales, Some("Acme"), None);
    assert_eq!(s.sample_count, 3);
    assert_eq!(s.min, Some(dec!(10)));
    assert_eq!(s.avg, Some(dec!(20)));
    assert_eq!(s.median, Some(dec!(20)));
    assert_eq!(s.p95, Some(dec!(29)));
}

/// No matching sales is an empty summary, not an error.
#[test]
fn empty_sample_has_no_statistics() {
    let sales = vec![sale(1, d(2024, 4, 1), 1, "Acme", dec!(30))];
    let s = summarize(sales, None, None);
    assert_eq!(s, PriceSummary::default());
    assert_eq!(s.sample_count, 0);
    assert!(s.min.is_none() && s.avg.is_none() && s.median.is_none() && s.p95.is_none());
}

/// With one sale every statistic is that price.
#[test]
fn single_sale_p95_equals_max() {
    let s = summarize(vec![sale(1, d(2024, 3, 9), 1, "Acme", dec!(123.45))], None, None);
    assert_eq!(s.sample_count, 1);
    assert_eq!(s.min, Some(dec!(123.45)));
    assert_eq!(s.median, Some(dec!(123.45)));
    assert_eq!(s.p95, Some(dec!(123.45)));
}

/// min <= median <= p95 <= max, and min <= avg <= max, for any sample.
#[test]
fn statistics_are_monotone() {
    let prices = [dec!(71), dec!(3), dec!(3), dec!(150000), dec!(42.5), dec!(999), dec!(8)];
    for n in 1..=prices.len() {
        let mut sample: Vec<Money> = prices[..n].to_vec();
        sample.sort();
        let s = price::summarize_sorted(&sample).unwrap();
        let max = *sample.last().unwrap();
        let (min, avg, median, p95) =
            (s.min.unwrap(), s.avg.unwrap(), s.median.unwrap(), s.p95.unwrap());
        assert!(min <= median && median <= p95 && p95 <= max, "n={n}");
        assert!(min <= avg && avg <= max, "n={n}");
    }
}

/// A price total past the decimal range is an error, not a panic.
#[test]
fn overflowing_price_total_is_an_error() {
    let sample = [Decimal::MAX, Decimal::MAX];
    let err = price::summarize_sorted(&sample).unwrap_err();
    assert!(matches!(err, AnalyticsError::Overflow { what: "price total" }));
}

/// Percentile endpoints are the sample extremes.
#[test]
fn percentile_endpoints() {
    let sample = [dec!(1), dec!(2), dec!(4), dec!(8)];
    assert_eq!(percentile_cont(&sample, Decimal::ZERO), Some(dec!(1)));
    assert_eq!(percentile_cont(&sample, Decimal::ONE), Some(dec!(8)));
    assert_eq!(percentile_cont(&sample, dec!(0.5)), Some(dec!(3)));
    assert_eq!(percentile_cont(&[], dec!(0.5)), None);
}

/// Brand and model filters match exactly; blank filters mean no filter.
#[test]
fn filters_and_blank_filters() {
    let sales = vec![
        model_sale(1, d(2024, 3, 1), "H4", dec!(100)),
        model_sale(2, d(2024, 3, 2), "H6", dec!(300)),
        sale(3, d(2024, 3, 3), 2, "Other", dec!(500)),
    ];
    assert_eq!(summarize(sales.clone(), Some("Acme"), None).sample_count, 2);
    assert_eq!(summarize(sales.clone(), Some("Acme"), Some("H6")).sample_count, 1);
    assert_eq!(summarize(sales.clone(), Some("acme"), None).sample_count, 0);
    assert_eq!(summarize(sales, Some(""), Some("  ")).sample_count, 3);
}
