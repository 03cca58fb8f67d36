//! Model pricing table.
//!
//! Rates are USD per 1000 tokens. Lookups never fail: unknown model
//! identifiers resolve to the table's fallback rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::PricingConfig;
use super::ids::ModelId;

/// Decimal places kept when deriving a cost from token usage.
pub const COST_DECIMAL_PLACES: u32 = 6;

/// Pricing information for a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelPricing {
    pub id: ModelId,
    pub display_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_1k: Decimal,
}

impl ModelPricing {
    pub fn new(
        id: impl Into<ModelId>,
        display_name: impl Into<String>,
        rate_per_1k: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            rate_per_1k,
        }
    }
}

// =============================================================================
// PRICING DATA
// =============================================================================

fn default_models() -> Vec<ModelPricing> {
    vec![
        ModelPricing::new("gpt-41", "GPT-4.1", Decimal::new(100, 4)),
        ModelPricing::new("gpt-41-mini", "GPT-4.1 mini", Decimal::new(20, 4)),
        ModelPricing::new("gpt-4o", "GPT-4o", Decimal::new(50, 4)),
        ModelPricing::new("claude-sonnet-4", "Claude Sonnet 4", Decimal::new(150, 4)),
        ModelPricing::new("gemini-25-pro", "Gemini 2.5 Pro", Decimal::new(70, 4)),
        ModelPricing::new("llama-33-70b", "Llama 3.3 70B", Decimal::new(9, 4)),
    ]
}

/// Read-only model pricing lookup, shared across concurrent adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    models: Vec<ModelPricing>,
    fallback_rate: Decimal,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            models: default_models(),
            fallback_rate: Decimal::ZERO,
        }
    }
}

impl PricingTable {
    pub fn new(models: Vec<ModelPricing>, fallback_rate: Decimal) -> Self {
        Self {
            models,
            fallback_rate,
        }
    }

    /// Embedded defaults with configured overrides applied.
    ///
    /// An override for an unknown model adds it to the table, using the
    /// identifier as its display name. Negative rates are clamped to zero.
    pub fn from_config(config: &PricingConfig) -> Self {
        let mut table = Self::default();
        table.fallback_rate = config.fallback_rate.max(Decimal::ZERO);

        let mut overrides: Vec<(ModelId, Decimal)> = config
            .rates
            .iter()
            .map(|(id, rate)| (ModelId::new(id), (*rate).max(Decimal::ZERO)))
            .collect();
        overrides.sort_by(|a, b| a.0.cmp(&b.0));

        for (id, rate) in overrides {
            match table.models.iter_mut().find(|m| m.id == id) {
                Some(existing) => existing.rate_per_1k = rate,
                None => {
                    let display = id.to_string();
                    table.models.push(ModelPricing::new(id, display, rate));
                }
            }
        }

        table
    }

    /// Get pricing for a model.
    pub fn get(&self, model: &ModelId) -> Option<&ModelPricing> {
        self.models.iter().find(|m| &m.id == model)
    }

    /// Rate for a model, falling back to the table default.
    pub fn rate(&self, model: &ModelId) -> Decimal {
        self.get(model)
            .map(|m| m.rate_per_1k)
            .unwrap_or(self.fallback_rate)
    }

    pub fn fallback_rate(&self) -> Decimal {
        self.fallback_rate
    }

    /// Human readable name, or the raw identifier for unknown models.
    pub fn display_name(&self, model: &ModelId) -> String {
        self.get(model)
            .map(|m| m.display_name.clone())
            .unwrap_or_else(|| model.to_string())
    }

    /// Cost of `tokens` at the model's rate, rounded to six decimal places.
    pub fn cost_for(&self, model: &ModelId, tokens: u64) -> Decimal {
        (Decimal::from(tokens) / Decimal::ONE_THOUSAND * self.rate(model))
            .round_dp(COST_DECIMAL_PLACES)
    }

    pub fn models(&self) -> &[ModelPricing] {
        &self.models
    }
}
