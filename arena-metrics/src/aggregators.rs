use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Distribution summary of one metric over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub mean: Decimal,
    pub median: Decimal,
    pub std_dev: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub p90: Decimal,
    pub p95: Decimal,
    pub count: usize,
    pub sum: Decimal,
}

impl Default for AggregatedMetrics {
    fn default() -> Self {
        Self {
            mean: Decimal::ZERO,
            median: Decimal::ZERO,
            std_dev: Decimal::ZERO,
            min: Decimal::ZERO,
            max: Decimal::ZERO,
            p90: Decimal::ZERO,
            p95: Decimal::ZERO,
            count: 0,
            sum: Decimal::ZERO,
        }
    }
}

pub struct MetricAggregator;

impl MetricAggregator {
    /// Aggregate a sample. Non-finite values are ignored; an empty sample is all zeros.
    pub fn aggregate(values: &[f64]) -> AggregatedMetrics {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return AggregatedMetrics::default();
        }
        sorted.sort_by(f64::total_cmp);

        let sample = sorted.as_slice();
        let sum: f64 = sample.iter().sum();
        let mean = sample.mean();
        let std_dev = if sample.len() > 1 {
            sample.population_std_dev()
        } else {
            0.0
        };

        AggregatedMetrics {
            mean: to_decimal(mean),
            median: to_decimal(Self::median(sample)),
            std_dev: to_decimal(std_dev),
            min: to_decimal(sample[0]),
            max: to_decimal(sample[sample.len() - 1]),
            p90: to_decimal(Self::percentile(sample, 90.0)),
            p95: to_decimal(Self::percentile(sample, 95.0)),
            count: sample.len(),
            sum: to_decimal(sum),
        }
    }

    /// Nearest-rank percentile of an ascending sample.
    pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
        if sorted_values.is_empty() {
            return 0.0;
        }
        let index = (percentile / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
        sorted_values[index.min(sorted_values.len() - 1)]
    }

    /// Median of an ascending sample; even sizes average the middle pair.
    pub fn median(sorted_values: &[f64]) -> f64 {
        let n = sorted_values.len();
        match n {
            0 => 0.0,
            _ if n % 2 == 1 => sorted_values[n / 2],
            _ => (sorted_values[n / 2 - 1] + sorted_values[n / 2]) / 2.0,
        }
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default()
}
