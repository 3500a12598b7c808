//! Form field validation and sanitization.
//!
//! Text is sanitized first (trimmed, control characters dropped, HTML
//! special characters escaped) and only then validated.

use storeadmin_core::{DomainError, DomainResult};

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Non-blank and at most `max_len` characters.
pub fn is_valid_string(value: &str, max_len: usize) -> bool {
    !value.trim().is_empty() && value.chars().count() <= max_len
}

/// Prices must be strictly positive (and finite).
pub fn is_valid_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Quantities are non-negative integers.
pub fn is_valid_quantity(value: i64) -> bool {
    value >= 0
}

/// Ids chosen in a form (e.g. warehouses) must be positive.
pub fn is_valid_id(value: i64) -> bool {
    value > 0
}

pub fn sanitize_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Parse a price typed into a form.
pub fn parse_price(raw: &str) -> DomainResult<f64> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DomainError::validation(format!("invalid price '{}'", raw.trim())))?;
    if !is_valid_price(price) {
        return Err(DomainError::validation("price must be greater than zero"));
    }
    Ok(price)
}

/// Parse a quantity typed into a form.
pub fn parse_quantity(raw: &str) -> DomainResult<i64> {
    let quantity = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| DomainError::validation(format!("invalid quantity '{}'", raw.trim())))?;
    if !is_valid_quantity(quantity) {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(quantity)
}
