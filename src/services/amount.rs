//! Monetary value parsing
//!
//! Feeds carry amounts either as JSON numbers or as display strings such as
//! `"1,234.50"`, `"¥100"` or `"$50"`. Parsing is total: anything that does
//! not yield a finite number becomes `0.0`. No rounding happens here.

use serde_json::Value;

/// Characters stripped before parsing: thousands separator and currency symbols
const STRIP_CHARS: &[char] = &[',', '¥', '￥', '$'];

/// Parse a raw amount value.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use subtrack::services::amount::parse_amount;
///
/// assert_eq!(parse_amount(Some(&json!("1,234.50"))), 1234.5);
/// assert_eq!(parse_amount(Some(&json!(42))), 42.0);
/// assert_eq!(parse_amount(None), 0.0);
/// ```
pub fn parse_amount(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => parse_amount_str(s),
        _ => 0.0,
    }
}

/// Parse an amount string, keeping the longest leading decimal literal.
pub fn parse_amount_str(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| !STRIP_CHARS.contains(c)).collect();
    let literal = leading_decimal(cleaned.trim());
    if literal.is_empty() {
        return 0.0;
    }
    match literal.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Longest prefix of `s` that forms a decimal literal: `[+-]digits[.digits][e[+-]digits]`.
/// Returns "" when the prefix contains no digits.
fn leading_decimal(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return "";
    }

    // Exponent only counts when followed by at least one digit
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    &s[..i]
}
