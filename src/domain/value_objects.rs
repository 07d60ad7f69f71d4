//! Value objects for the cart engine

use serde::{Deserialize, Serialize};

/// Price exactly as it appears in the persisted record: either a plain
/// number or a display string such as `"2.929.000 ₫"`. The stored
/// representation is never rewritten; only total computation normalizes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

impl PriceField {
    /// Canonical numeric amount.
    ///
    /// Strings keep their decimal digits only and parse as a whole-unit
    /// amount (VND has no subunits); a string with no digits is 0.
    /// Numbers pass through unchanged.
    pub fn normalize(&self) -> f64 {
        match self {
            PriceField::Number(n) => *n,
            PriceField::Text(s) => {
                let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse::<i64>().map(|v| v as f64).unwrap_or(0.0)
            }
        }
    }
}

/// Canonical numeric amount for a raw price field.
pub fn normalize_price(price: &PriceField) -> f64 {
    price.normalize()
}

/// Quantity used in total computation: a zero quantity counts as 1.
pub fn effective_quantity(quantity: u32) -> u32 {
    quantity.max(1)
}

/// Formats a whole-unit amount the vi-VN way: dot-grouped thousands and a
/// trailing dong sign, e.g. `3.429.000 ₫`.
pub fn format_vnd(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{grouped} ₫")
    } else {
        format!("{grouped} ₫")
    }
}
