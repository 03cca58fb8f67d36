use arena_core::{CombinationOutcome, RecordSource};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::aggregators::{AggregatedMetrics, MetricAggregator};

/// Distribution of latency, cost and tokens over the valid outcomes of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub live: usize,
    pub mock: usize,
    pub failed: usize,
    pub latency_ms: AggregatedMetrics,
    pub cost: AggregatedMetrics,
    pub tokens: AggregatedMetrics,
}

impl BatchStatistics {
    pub fn from_outcomes(outcomes: &[CombinationOutcome]) -> Self {
        let count_source =
            |source: RecordSource| outcomes.iter().filter(|o| o.record.source == source).count();
        let failed = outcomes.iter().filter(|o| o.is_error()).count();

        let valid: Vec<&CombinationOutcome> = outcomes.iter().filter(|o| !o.is_error()).collect();
        let latencies: Vec<f64> = valid.iter().map(|o| o.latency_ms as f64).collect();
        let costs: Vec<f64> = valid
            .iter()
            .filter_map(|o| o.record.cost.to_f64())
            .collect();
        let tokens: Vec<f64> = valid.iter().map(|o| o.record.tokens as f64).collect();

        Self {
            total: outcomes.len(),
            live: count_source(RecordSource::Live),
            mock: count_source(RecordSource::Mock),
            failed,
            latency_ms: MetricAggregator::aggregate(&latencies),
            cost: MetricAggregator::aggregate(&costs),
            tokens: MetricAggregator::aggregate(&tokens),
        }
    }
}
