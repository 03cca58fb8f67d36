use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use validator::Validate;

use super::ids::FrameworkId;
use crate::error::{CoreError, Result};

// ===== Simulator Configuration =====

/// Upstream used by the simulation strategy (OpenAI-compatible chat API).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct SimulatorSettings {
    #[validate(url)]
    pub base_url: String,
    /// Model that role-plays the target framework.
    #[validate(length(min = 1, max = 255))]
    pub model: String,
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,
    #[validate(range(max = 10))]
    pub max_retries: u32,
    #[validate(range(max = 60_000))]
    pub retry_backoff_ms: u64,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 250,
            temperature: 0.7,
        }
    }
}

impl SimulatorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// ===== Credentials =====

/// Raw per-framework credentials, exactly as configured.
///
/// Values are opaque and unsanitized here; the provider layer decides whether
/// a value is usable. `Debug` never prints the values.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, framework: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(framework, value);
        self
    }

    pub fn insert(&mut self, framework: impl AsRef<str>, value: impl Into<String>) {
        let key = FrameworkId::new(framework).as_str().to_string();
        self.0.insert(key, value.into());
    }

    /// Raw value configured for a framework, if any.
    pub fn get(&self, framework: &FrameworkId) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| FrameworkId::new(key.as_str()) == *framework)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        f.debug_struct("Credentials")
            .field("frameworks", &keys)
            .finish_non_exhaustive()
    }
}

// ===== Mock Path Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct MockSettings {
    /// Synthetic delay applied to every mock record.
    #[validate(range(max = 60_000))]
    pub latency_ms: u64,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self { latency_ms: 100 }
    }
}

impl MockSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

// ===== Pricing Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PricingConfig {
    /// Rate used for models missing from the table.
    pub fallback_rate: Decimal,
    /// Per-model rate overrides, USD per 1000 tokens.
    pub rates: HashMap<String, Decimal>,
}

// ===== Dispatch Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
#[serde(default)]
pub struct DispatchSettings {
    /// Upper bound on in-flight combinations; unbounded when absent.
    #[validate(range(min = 1))]
    pub max_concurrency: Option<usize>,
}

// ===== Complete Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
#[serde(default)]
pub struct ArenaConfig {
    #[validate(nested)]
    pub simulator: SimulatorSettings,
    pub credentials: Credentials,
    #[validate(nested)]
    pub mock: MockSettings,
    pub pricing: PricingConfig,
    #[validate(nested)]
    pub dispatch: DispatchSettings,
}

impl ArenaConfig {
    /// Validate field constraints, including the ones `validator` cannot express.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.pricing.fallback_rate.is_sign_negative() {
            return Err(CoreError::Validation(
                "pricing.fallback_rate must not be negative".to_string(),
            ));
        }

        if let Some((model, _)) = self
            .pricing
            .rates
            .iter()
            .find(|(_, rate)| rate.is_sign_negative())
        {
            return Err(CoreError::Validation(format!(
                "pricing.rates.{} must not be negative",
                model
            )));
        }

        Ok(())
    }
}
