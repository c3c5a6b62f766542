//! # Field Helpers
//!
//! "Try these keys in order, else default" accessors over untyped JSON.
//!
//! Provider payloads are never validated against a schema. Every read goes
//! through these helpers so that a missing or malformed field yields `None`
//! (or the caller's default) instead of an error.
//!
//! # Examples
//!
//! ```
//! use insurance_offers::infrastructure::providers::fields::{first_string, parse_decimal};
//! use rust_decimal::Decimal;
//! use serde_json::json;
//!
//! let record = json!({ "nome": "UA 60", "total": "1.234,50" });
//!
//! assert_eq!(first_string(&record, &["name", "nome"]).as_deref(), Some("UA 60"));
//! assert_eq!(parse_decimal(&record["total"]), Some(Decimal::new(123450, 2)));
//! ```

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Returns the first non-empty string among `keys`.
///
/// Numbers are accepted and rendered as strings.
#[must_use]
pub fn first_string(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(value_as_string)
}

/// Returns the first non-empty array among `keys`.
#[must_use]
pub fn first_array<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_array)
        .find(|items| !items.is_empty())
}

/// Renders a string or number value as a trimmed, non-empty string.
#[must_use]
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a JSON number or numeric string as a decimal.
///
/// Strings may carry a currency marker and use either `.` or `,` as the
/// decimal separator (`"R$ 1.234,56"`, `"1,234.56"`, `"189,90"`).
#[must_use]
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let has_real_marker = trimmed.starts_with("R$");
    let cleaned: String = trimmed
        .trim_start_matches("R$")
        .trim_start_matches("US$")
        .trim_start_matches(['$', '€'])
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, Some(_)) if is_dot_grouped(&cleaned, has_real_marker) => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// True when a dot-only number uses dots as thousands separators
/// (`R$ 1.234`, `1.234.567`, `60.000`).
fn is_dot_grouped(cleaned: &str, has_real_marker: bool) -> bool {
    let mut groups = cleaned.split('.');
    let leading = groups.next().unwrap_or_default();
    let rest: Vec<&str> = groups.collect();

    let well_formed = !leading.is_empty()
        && leading.len() <= 3
        && leading.chars().all(|c| c.is_ascii_digit())
        && rest
            .iter()
            .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return false;
    }

    has_real_marker || rest.len() > 1 || rest.iter().all(|group| *group == "000")
}
