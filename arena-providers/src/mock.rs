//! Mock path
//!
//! Network-free substitute used when no usable credential is configured or a
//! live call fails in a recoverable way. Metrics are fixed constants because
//! no real usage occurred.

use arena_core::{FrameworkProfile, RecordSource, ResultRecord};
use rust_decimal::Decimal;
use std::time::Duration;

pub const MOCK_TOKENS: u64 = 250;
pub const MOCK_QUALITY: u8 = 95;
pub const MOCK_COVERAGE: u8 = 98;
pub const MOCK_SAFETY: u8 = 100;

/// Characters of the task quoted in mock narratives.
const TASK_EXCERPT_CHARS: usize = 60;

/// Fixed mock cost, 0.0025.
pub fn mock_cost() -> Decimal {
    Decimal::new(25, 4)
}

#[derive(Debug, Clone)]
pub struct MockPath {
    latency: Duration,
}

impl MockPath {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Wait out the synthetic latency, then build the record.
    pub async fn respond(
        &self,
        profile: &FrameworkProfile,
        model_display: &str,
        task: &str,
    ) -> ResultRecord {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Self::record(profile, model_display, task)
    }

    pub fn record(profile: &FrameworkProfile, model_display: &str, task: &str) -> ResultRecord {
        let name = &profile.display_name;
        let excerpt = task_excerpt(task);

        let mut stages: Vec<&str> = profile.process_stages().into_iter().take(2).collect();
        if stages.is_empty() {
            stages.push("planned the approach");
        }

        let mut steps = Vec::with_capacity(stages.len() + 2);
        steps.push(format!("{name}: received task \"{excerpt}\""));
        steps.extend(stages.iter().map(|stage| format!("{name}: {stage}")));
        steps.push(format!("{name}: assembled the final answer with {model_display}"));

        let output = format!(
            "[{name} · {model_display} · simulated]\n\
             {name} worked through \"{excerpt}\" and produced a structured response. \
             This is a simulated result; configure a credential for live execution."
        );

        ResultRecord {
            output,
            tokens: MOCK_TOKENS,
            cost: mock_cost(),
            steps,
            quality: MOCK_QUALITY,
            coverage: MOCK_COVERAGE,
            safety: MOCK_SAFETY,
            source: RecordSource::Mock,
            error: None,
        }
    }
}

impl Default for MockPath {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

fn task_excerpt(task: &str) -> String {
    let flattened = task.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.is_empty() {
        return "(empty task)".to_string();
    }

    let mut chars = flattened.chars();
    let excerpt: String = chars.by_ref().take(TASK_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{excerpt}…")
    } else {
        excerpt
    }
}
