//! Model price table

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// USD price per 1K tokens for one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl ModelPrice {
    pub fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }
}

/// Map of model id to token prices
///
/// Kept as configuration so prices can change without touching the engine.
/// Models missing from the table price at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    models: HashMap<String, ModelPrice>,
}

impl PriceTable {
    /// Create an empty table (everything prices at zero)
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Add or replace a model price
    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.models.insert(model.into(), price);
        self
    }

    /// Look up a model price
    pub fn get(&self, model: &str) -> Option<&ModelPrice> {
        self.models.get(model)
    }

    /// Cost of one call in USD
    pub fn cost_usd(&self, model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        match self.models.get(model) {
            Some(price) => {
                (prompt_tokens as f64 / 1000.0) * price.input_per_1k
                    + (completion_tokens as f64 / 1000.0) * price.output_per_1k
            }
            None => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::empty()
            .with_price("gpt-4o", ModelPrice::new(0.0025, 0.01))
            .with_price("gpt-4o-mini", ModelPrice::new(0.00015, 0.0006))
            .with_price("gpt-4-turbo", ModelPrice::new(0.01, 0.03))
            .with_price("gpt-3.5-turbo", ModelPrice::new(0.0005, 0.0015))
            .with_price("claude-3-5-sonnet", ModelPrice::new(0.003, 0.015))
            .with_price("claude-3-haiku", ModelPrice::new(0.00025, 0.00125))
    }
}

impl Validatable for PriceTable {
    fn validate(&self) -> ConfigResult<()> {
        for (model, price) in &self.models {
            if model.trim().is_empty() {
                return Err(self.validation_error("model id cannot be empty"));
            }
            let valid = |v: f64| v.is_finite() && v >= 0.0;
            if !valid(price.input_per_1k) || !valid(price.output_per_1k) {
                return Err(self.validation_error(format!(
                    "prices for '{}' must be finite and non-negative",
                    model
                )));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "pricing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_for_known_model() {
        let table = PriceTable::empty().with_price("m", ModelPrice::new(0.001, 0.002));
        let cost = table.cost_usd("m", 2000, 500);
        assert!((cost - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_model_prices_at_zero() {
        let table = PriceTable::default();
        assert_eq!(table.cost_usd("some-local-model", 10_000, 10_000), 0.0);
    }

    #[test]
    fn test_price_table_yaml_is_a_plain_map() {
        let table: PriceTable =
            serde_yaml::from_str("my-model:\n  input_per_1k: 0.5\n  output_per_1k: 1.0\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("my-model"), Some(&ModelPrice::new(0.5, 1.0)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let table = PriceTable::empty().with_price("m", ModelPrice::new(-1.0, 0.0));
        assert!(table.validate().is_err());
    }
}
