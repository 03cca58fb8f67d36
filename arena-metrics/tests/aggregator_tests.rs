use approx::assert_relative_eq;
use arena_metrics::aggregators::MetricAggregator;
use rstest::rstest;
use rust_decimal::Decimal;

fn f(value: Decimal) -> f64 {
    f64::try_from(value).unwrap()
}

// ===== Basic Aggregation Tests =====

#[test]
fn test_aggregate_basic_stats() {
    let values = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let aggregated = MetricAggregator::aggregate(&values);

    assert_eq!(aggregated.count, 5);
    assert_eq!(aggregated.min, Decimal::try_from(10.0).unwrap());
    assert_eq!(aggregated.max, Decimal::try_from(50.0).unwrap());
    assert_relative_eq!(f(aggregated.mean), 30.0, epsilon = 0.01);
    assert_relative_eq!(f(aggregated.median), 30.0, epsilon = 0.01);
    assert_relative_eq!(f(aggregated.sum), 150.0, epsilon = 0.01);
}

#[test]
fn test_aggregate_median_even_count_averages_middle_pair() {
    let aggregated = MetricAggregator::aggregate(&[4.0, 1.0, 3.0, 2.0]);
    assert_relative_eq!(f(aggregated.median), 2.5, epsilon = 1e-9);
}

#[test]
fn test_aggregate_std_dev() {
    let aggregated = MetricAggregator::aggregate(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    assert_relative_eq!(f(aggregated.std_dev), 2.0, epsilon = 1e-6);
}

#[test]
fn test_aggregate_std_dev_identical_values() {
    let aggregated = MetricAggregator::aggregate(&[5.0, 5.0, 5.0]);
    assert_eq!(aggregated.std_dev, Decimal::ZERO);
}

#[test]
fn test_aggregate_percentile_ordering() {
    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let aggregated = MetricAggregator::aggregate(&values);

    assert!(aggregated.median <= aggregated.p90);
    assert!(aggregated.p90 <= aggregated.p95);
    assert!(aggregated.p95 <= aggregated.max);
    assert_relative_eq!(f(aggregated.p90), 90.0, epsilon = 1.0);
    assert_relative_eq!(f(aggregated.p95), 95.0, epsilon = 1.0);
}

#[test]
fn test_aggregate_unsorted_input() {
    let aggregated = MetricAggregator::aggregate(&[300.0, 100.0, 200.0]);
    assert_relative_eq!(f(aggregated.min), 100.0);
    assert_relative_eq!(f(aggregated.max), 300.0);
}

// ===== Edge Cases =====

#[test]
fn test_aggregate_empty_values() {
    let aggregated = MetricAggregator::aggregate(&[]);
    assert_eq!(aggregated.count, 0);
    assert_eq!(aggregated.mean, Decimal::ZERO);
    assert_eq!(aggregated.max, Decimal::ZERO);
}

#[test]
fn test_aggregate_single_value() {
    let aggregated = MetricAggregator::aggregate(&[42.0]);
    assert_eq!(aggregated.count, 1);
    assert_relative_eq!(f(aggregated.mean), 42.0);
    assert_relative_eq!(f(aggregated.median), 42.0);
    assert_relative_eq!(f(aggregated.p95), 42.0);
    assert_eq!(aggregated.std_dev, Decimal::ZERO);
}

#[test]
fn test_aggregate_ignores_non_finite_values() {
    let aggregated = MetricAggregator::aggregate(&[1.0, f64::NAN, 3.0, f64::INFINITY]);
    assert_eq!(aggregated.count, 2);
    assert_relative_eq!(f(aggregated.mean), 2.0);
}

#[test]
fn test_aggregate_very_small_values() {
    let aggregated = MetricAggregator::aggregate(&[0.0025, 0.0025, 0.01234]);
    assert_relative_eq!(f(aggregated.min), 0.0025, epsilon = 1e-9);
    assert_relative_eq!(f(aggregated.sum), 0.01734, epsilon = 1e-9);
}

// ===== Percentile Tests =====

#[rstest]
#[case(0.0, 10.0)]
#[case(50.0, 30.0)]
#[case(100.0, 50.0)]
fn test_percentile_nearest_rank(#[case] percentile: f64, #[case] expected: f64) {
    let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
    assert_relative_eq!(MetricAggregator::percentile(&sorted, percentile), expected);
}

#[test]
fn test_percentile_empty() {
    assert_eq!(MetricAggregator::percentile(&[], 90.0), 0.0);
    assert_eq!(MetricAggregator::median(&[]), 0.0);
}
