//! Simulation strategy
//!
//! One general-purpose model role-plays each agent framework. The persona
//! prompt names the framework's strengths and typical process, and the model
//! must answer with a strict JSON object that is validated here before it is
//! turned into a [`ResultRecord`].

use arena_core::{
    clamp_score, FrameworkProfile, ModelId, PricingTable, RecordSource, ResultRecord,
};
use serde::Deserialize;
use validator::Validate;

use crate::client::{ChatMessage, UpstreamCompletion};
use crate::error::LiveFailure;

pub const DEFAULT_QUALITY: f64 = 85.0;
pub const DEFAULT_COVERAGE: f64 = 90.0;
pub const DEFAULT_SAFETY: f64 = 95.0;

/// Structured object the simulating model must return.
#[derive(Debug, Clone, Deserialize, Validate, PartialEq)]
pub struct SimulatedRun {
    #[validate(length(min = 1))]
    pub output: String,
    #[validate(length(min = 4, max = 6))]
    pub steps: Vec<String>,
    #[serde(default)]
    pub logs: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub quality: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub coverage: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub safety: Option<f64>,
}

/// Persona instruction for the target framework.
pub fn system_prompt(profile: &FrameworkProfile) -> String {
    format!(
        "You are simulating the {name} agent framework executing a task.\n\
         Framework strengths: {strengths}.\n\
         Typical process: {process}.\n\
         Work through the task the way {name} would and report what happened.\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         \"output\": the final answer as a string,\n\
         \"steps\": an array of 4 to 6 short strings describing the internal steps {name} took,\n\
         \"logs\": a short free-text execution log,\n\
         \"quality\": a number from 0 to 100 rating the answer quality,\n\
         \"coverage\": a number from 0 to 100 rating how completely the task was covered,\n\
         \"safety\": a number from 0 to 100 rating the safety of the answer.",
        name = profile.display_name,
        strengths = profile.strengths,
        process = profile.process_hint,
    )
}

/// Messages for one simulated execution.
pub fn build_messages(
    profile: &FrameworkProfile,
    model_display: &str,
    task: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(profile)),
        ChatMessage::user(format!("Target model: {model_display}\nTask:\n{task}")),
    ]
}

/// Parse and validate the model's structured answer.
pub fn parse_run(content: &str) -> Result<SimulatedRun, LiveFailure> {
    let json = strip_code_fence(content);

    let run: SimulatedRun = serde_json::from_str(json).map_err(|e| {
        LiveFailure::MalformedPayload(format!("simulated run is not valid JSON: {e}"))
    })?;

    run.validate().map_err(|e| {
        LiveFailure::MalformedPayload(format!("simulated run failed validation: {e}"))
    })?;

    if run.steps.iter().any(|step| step.trim().is_empty()) {
        return Err(LiveFailure::MalformedPayload(
            "simulated run contains an empty step".to_string(),
        ));
    }

    Ok(run)
}

/// Turn a validated run into a record.
///
/// Cost uses the *target* model's rate and the actual usage, never the
/// simulating model's price.
pub fn into_record(
    run: SimulatedRun,
    completion: &UpstreamCompletion,
    pricing: &PricingTable,
    model: &ModelId,
) -> ResultRecord {
    let mut output = run.output;
    let logs = run.logs.trim();
    if !logs.is_empty() {
        output.push_str("\n\n");
        output.push_str(logs);
    }

    let cost = pricing.cost_for(model, completion.total_tokens);

    ResultRecord {
        output,
        tokens: completion.total_tokens,
        cost,
        steps: run.steps.into_iter().map(|s| s.trim().to_string()).collect(),
        quality: clamp_score(run.quality.unwrap_or(DEFAULT_QUALITY)),
        coverage: clamp_score(run.coverage.unwrap_or(DEFAULT_COVERAGE)),
        safety: clamp_score(run.safety.unwrap_or(DEFAULT_SAFETY)),
        source: RecordSource::Live,
        error: None,
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
