//! Batch highlights
//!
//! Picks the fastest, cheapest and highest-quality combination of a batch and
//! the mean token usage. Failed outcomes never participate. Ties go to the
//! outcome that comes first in batch order.

use arena_core::{Combination, CombinationOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Points at the winning outcome of one highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRef<T> {
    pub index: usize,
    pub combination: Combination,
    pub value: T,
}

impl<T> HighlightRef<T> {
    fn of(outcome: &CombinationOutcome, value: T) -> Self {
        Self {
            index: outcome.index,
            combination: outcome.combination.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub fastest: HighlightRef<u64>,
    pub cheapest: HighlightRef<Decimal>,
    pub highest_quality: HighlightRef<u8>,
    /// Mean tokens over valid outcomes, rounded half up.
    pub average_tokens: u64,
    pub valid_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    NoData,
    Available(Highlights),
}

impl Summary {
    pub fn highlights(&self) -> Option<&Highlights> {
        match self {
            Summary::NoData => None,
            Summary::Available(highlights) => Some(highlights),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Summary::NoData)
    }
}

/// Compute the highlights of a batch.
pub fn summarize(outcomes: &[CombinationOutcome]) -> Summary {
    let valid: Vec<&CombinationOutcome> = outcomes.iter().filter(|o| !o.is_error()).collect();

    // min_by_key keeps the first of equal keys, which is the tie-break we want.
    let (Some(fastest), Some(cheapest), Some(best)) = (
        valid.iter().min_by_key(|o| o.latency_ms),
        valid.iter().min_by_key(|o| o.record.cost),
        valid.iter().min_by_key(|o| Reverse(o.record.quality)),
    ) else {
        return Summary::NoData;
    };

    let total_tokens: u128 = valid.iter().map(|o| u128::from(o.record.tokens)).sum();

    Summary::Available(Highlights {
        fastest: HighlightRef::of(fastest, fastest.latency_ms),
        cheapest: HighlightRef::of(cheapest, cheapest.record.cost),
        highest_quality: HighlightRef::of(best, best.record.quality),
        average_tokens: mean_half_up(total_tokens, valid.len()),
        valid_count: valid.len(),
    })
}

fn mean_half_up(total: u128, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let count = count as u128;
    let mean = (2 * total + count) / (2 * count);
    u64::try_from(mean).unwrap_or(u64::MAX)
}
