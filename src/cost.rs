//! Monetary estimates for revision requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::revision::estimate_tokens;

const TOKENS_PER_PRICING_UNIT: f64 = 1_000_000.0;

/// Per-million-token prices for one model, in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price of one million prompt tokens.
    pub input_per_1m: f64,
    /// Price of one million completion tokens.
    pub output_per_1m: f64,
}

/// Pricing for every model the configuration document knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    models: BTreeMap<String, ModelPricing>,
}

impl PricingTable {
    /// Builds a table from `(model, pricing)` pairs.
    #[must_use]
    pub fn from_entries(
        entries: impl IntoIterator<Item = (impl Into<String>, ModelPricing)>,
    ) -> Self {
        Self {
            models: entries
                .into_iter()
                .map(|(model, pricing)| (model.into(), pricing))
                .collect(),
        }
    }

    /// Pricing for `model`, when known.
    #[must_use]
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.models.get(model).copied()
    }

    /// Known model identifiers in sorted order.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// Estimates the cost of sending `input` and receiving `output`.
///
/// Unknown models cost nothing; the gap is logged rather than raised.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "allow float arithmetic for cost estimation"
)]
pub fn estimate_cost(input: &str, output: &str, model: &str, pricing: &PricingTable) -> f64 {
    let Some(model_pricing) = pricing.get(model) else {
        tracing::warn!(model, "no pricing entry for model; reporting zero cost");
        return 0.0;
    };

    priced(estimate_tokens(input), model_pricing.input_per_1m)
        + priced(estimate_tokens(output), model_pricing.output_per_1m)
}

/// Pre-submission estimate: twice the cost of echoing `text` back.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "allow float arithmetic for cost estimation"
)]
pub fn estimate_submission_cost(text: &str, model: &str, pricing: &PricingTable) -> f64 {
    estimate_cost(text, text, model, pricing) * 2.0
}

#[expect(
    clippy::float_arithmetic,
    reason = "allow float arithmetic for cost estimation"
)]
fn priced(tokens: usize, per_million: f64) -> f64 {
    let token_count = f64::from(u32::try_from(tokens).unwrap_or(u32::MAX));
    token_count / TOKENS_PER_PRICING_UNIT * per_million
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{ModelPricing, PricingTable, estimate_cost, estimate_submission_cost};

    #[fixture]
    fn pricing() -> PricingTable {
        PricingTable::from_entries([(
            "gpt-4o-mini",
            ModelPricing {
                input_per_1m: 0.15,
                output_per_1m: 0.6,
            },
        )])
    }

    fn approx_eq(left: f64, right: f64) -> bool {
        #[expect(clippy::float_arithmetic, reason = "test tolerance comparison")]
        let delta = (left - right).abs();
        delta < 1e-12
    }

    #[rstest]
    fn prices_input_and_output_tokens(pricing: PricingTable) {
        let input = "a".repeat(4_000);
        let output = "b".repeat(8_000);

        let cost = estimate_cost(&input, &output, "gpt-4o-mini", &pricing);

        // 1000 input tokens and 2000 output tokens.
        assert!(approx_eq(cost, 0.001_35), "unexpected cost {cost}");
    }

    #[rstest]
    fn unknown_model_costs_nothing(pricing: PricingTable) {
        assert!(approx_eq(
            estimate_cost("some text", "more text", "mystery-model", &pricing),
            0.0
        ));
    }

    #[rstest]
    fn cost_grows_with_length(pricing: PricingTable) {
        let short = estimate_cost("short", "short", "gpt-4o-mini", &pricing);
        let long = estimate_cost(&"long ".repeat(500), "long", "gpt-4o-mini", &pricing);

        assert!(long > short);
    }

    #[rstest]
    fn submission_estimate_doubles_the_echo_cost(pricing: PricingTable) {
        let text = "x".repeat(400);
        let echo = estimate_cost(&text, &text, "gpt-4o-mini", &pricing);

        #[expect(clippy::float_arithmetic, reason = "expected value computation")]
        let expected = echo * 2.0;
        assert!(approx_eq(
            estimate_submission_cost(&text, "gpt-4o-mini", &pricing),
            expected
        ));
    }

    #[test]
    fn lists_models_in_sorted_order() {
        let zero = ModelPricing {
            input_per_1m: 0.0,
            output_per_1m: 0.0,
        };
        let table = PricingTable::from_entries([("b-model", zero), ("a-model", zero)]);

        assert_eq!(table.models().collect::<Vec<_>>(), vec!["a-model", "b-model"]);
    }
}
