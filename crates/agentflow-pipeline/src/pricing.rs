//! Static per-model pricing table (C2). Pure lookup, no I/O.

/// Price per 1,000,000 tokens, in USD.
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Fallback price applied to any model not present in [`PRICE_TABLE`].
pub const DEFAULT_PRICE: ModelPrice = ModelPrice {
    input_per_million: 1.00,
    output_per_million: 3.00,
};

const PRICE_TABLE: &[(&str, ModelPrice)] = &[
    (
        "gpt-4o",
        ModelPrice {
            input_per_million: 2.50,
            output_per_million: 10.00,
        },
    ),
    (
        "gpt-4o-mini",
        ModelPrice {
            input_per_million: 0.15,
            output_per_million: 0.60,
        },
    ),
    (
        "gpt-4-turbo",
        ModelPrice {
            input_per_million: 10.00,
            output_per_million: 30.00,
        },
    ),
    (
        "claude-opus-4-5-20251101",
        ModelPrice {
            input_per_million: 15.00,
            output_per_million: 75.00,
        },
    ),
    (
        "claude-sonnet-4-5-20250929",
        ModelPrice {
            input_per_million: 3.00,
            output_per_million: 15.00,
        },
    ),
    (
        "claude-haiku-4-5-20251001",
        ModelPrice {
            input_per_million: 0.80,
            output_per_million: 4.00,
        },
    ),
];

pub fn price_for(model: &str) -> ModelPrice {
    PRICE_TABLE
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_PRICE)
}

/// cost = input_tokens * input_price/1e6 + output_tokens * output_price/1e6,
/// rounded to 8 decimal places.
pub fn cost_usd(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let price = price_for(model);
    let raw = (input_tokens as f64) * price.input_per_million / 1_000_000.0
        + (output_tokens as f64) * price.output_per_million / 1_000_000.0;
    (raw * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tokens_cost_zero() {
        assert_eq!(cost_usd("gpt-4o", 0, 0), 0.0);
    }

    #[test]
    fn unknown_model_uses_default_price() {
        let cost = cost_usd("some-unreleased-model", 1_000_000, 0);
        assert_eq!(cost, DEFAULT_PRICE.input_per_million);
    }

    #[test]
    fn cost_is_monotonic_in_both_token_counts() {
        let base = cost_usd("gpt-4o-mini", 100, 100);
        let more_input = cost_usd("gpt-4o-mini", 200, 100);
        let more_output = cost_usd("gpt-4o-mini", 100, 200);
        assert!(more_input >= base);
        assert!(more_output >= base);
    }

    #[test]
    fn rounds_to_eight_decimal_places() {
        let cost = cost_usd("gpt-4o-mini", 7, 3);
        let scaled = cost * 1e8;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }
}
