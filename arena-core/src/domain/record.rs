use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::combination::Combination;
use super::ids::BatchId;

/// Upper bound for the reported quality, coverage and safety scores.
pub const MAX_SCORE: u8 = 100;

/// Where a record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Produced from a real upstream response.
    Live,
    /// Deterministic substitute, no real usage occurred.
    #[default]
    Mock,
    /// The combination failed; metrics are zero and `error` is set.
    Unavailable,
}

/// Normalized output of one combination.
///
/// Scores are opaque reported values: vendor-reported, self-reported by the
/// simulating model, or fixed mock constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub output: String,
    pub tokens: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    pub steps: Vec<String>,
    pub quality: u8,
    pub coverage: u8,
    pub safety: u8,
    #[serde(default)]
    pub source: RecordSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    /// Zero-metric record for a combination that could not be evaluated.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "combination unavailable".to_string();
        }

        Self {
            output: String::new(),
            tokens: 0,
            cost: Decimal::ZERO,
            steps: Vec::new(),
            quality: 0,
            coverage: 0,
            safety: 0,
            source: RecordSource::Unavailable,
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Clamp a reported score into `0..=100`, rounding to the nearest integer.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, MAX_SCORE as f64) as u8
}

/// One settled combination inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinationOutcome {
    /// Position in the requested combination list.
    pub index: usize,
    pub combination: Combination,
    /// Wall-clock time spent in the adapter, in milliseconds.
    pub latency_ms: u64,
    pub record: ResultRecord,
}

impl CombinationOutcome {
    pub fn is_error(&self) -> bool {
        self.record.is_error()
    }
}

/// A completed batch. Outcomes are ordered by combination index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchRun {
    pub id: BatchId,
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub outcomes: Vec<CombinationOutcome>,
}

impl BatchRun {
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }

    pub fn records(&self) -> impl Iterator<Item = &ResultRecord> {
        self.outcomes.iter().map(|o| &o.record)
    }
}
