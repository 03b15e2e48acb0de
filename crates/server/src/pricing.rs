use warden_core::TokenUsage;

/// Cost per 1000 tokens, split by prompt and completion.
#[derive(Debug, Clone, Copy)]
struct ModelRate {
    prompt_per_1k: f64,
    completion_per_1k: f64,
}

/// Conservative fallback applied to unknown (provider, model) pairs so
/// estimates err high rather than low.
const FALLBACK_RATE: ModelRate = ModelRate {
    prompt_per_1k: 0.01,
    completion_per_1k: 0.03,
};

/// Static provider/model pricing table for cost estimation.
///
/// Rates are point-in-time list prices; the estimate is advisory and
/// feeds dashboards, not billing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PricingTable;

impl PricingTable {
    /// Create the table.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Estimate the cost of one call in USD.
    #[must_use]
    pub fn estimate(&self, provider: &str, model: &str, usage: TokenUsage) -> f64 {
        let rate = Self::rate_for(provider, model);
        #[allow(clippy::cast_precision_loss)]
        let cost = (usage.prompt as f64 / 1000.0) * rate.prompt_per_1k
            + (usage.completion as f64 / 1000.0) * rate.completion_per_1k;
        cost
    }

    fn rate_for(provider: &str, model: &str) -> ModelRate {
        let model = model.to_ascii_lowercase();
        let pick = |prompt: f64, completion: f64| ModelRate {
            prompt_per_1k: prompt,
            completion_per_1k: completion,
        };

        match provider.to_ascii_lowercase().as_str() {
            "openai" => {
                if model.starts_with("gpt-4o-mini") {
                    pick(0.000_15, 0.000_6)
                } else if model.starts_with("gpt-4o") {
                    pick(0.002_5, 0.01)
                } else if model.starts_with("gpt-4") {
                    pick(0.03, 0.06)
                } else if model.starts_with("gpt-3.5") {
                    pick(0.000_5, 0.001_5)
                } else {
                    FALLBACK_RATE
                }
            }
            "anthropic" => {
                if model.contains("opus") {
                    pick(0.015, 0.075)
                } else if model.contains("sonnet") {
                    pick(0.003, 0.015)
                } else if model.contains("haiku") {
                    pick(0.000_25, 0.001_25)
                } else {
                    FALLBACK_RATE
                }
            }
            "google" => {
                if model.starts_with("gemini-1.5-pro") {
                    pick(0.001_25, 0.005)
                } else if model.starts_with("gemini-1.5-flash") {
                    pick(0.000_075, 0.000_3)
                } else {
                    FALLBACK_RATE
                }
            }
            _ => FALLBACK_RATE,
        }
    }
}
