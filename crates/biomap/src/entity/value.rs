//! Cleaning helpers for raw field values.

use serde_json::Value;

/// Dash-like characters that stand in for "no value".
pub const DASHES: &[&str] = &[
    "-",        // hyphen-minus
    "\u{2013}", // en dash
    "\u{2014}", // em dash
    "\u{2212}", // minus sign
    "\u{2010}", // hyphen
    "\u{2011}", // non-breaking hyphen
    "\u{2012}", // figure dash
];

/// Check whether a string is exactly one of the dash-like placeholders.
pub fn is_dash(value: &str) -> bool {
    DASHES.contains(&value)
}

/// Check whether a field value carries no usable content.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || is_dash(trimmed)
        }
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Flatten a field value into its individual entries.
///
/// Scalars become one-element lists, arrays are returned element-wise and
/// null becomes an empty list.
pub fn value_to_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Stringify and clean a local identifier.
///
/// Numbers lose a spurious trailing `.0`, whitespace is trimmed and a
/// dash-only value becomes empty (treated as absent, not invalid).
pub fn clean_local_id(value: &Value) -> String {
    let raw = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };

    if let Some(whole) = strip_whole_float_suffix(&raw) {
        return whole.to_string();
    }

    if is_dash(&raw) { String::new() } else { raw }
}

/// `"10917.0"` -> `"10917"`; anything that is not a whole float is left alone.
fn strip_whole_float_suffix(raw: &str) -> Option<&str> {
    let stripped = raw.strip_suffix(".0")?;
    let parsed: f64 = raw.parse().ok()?;
    if parsed.is_finite() && parsed.fract() == 0.0 && !stripped.is_empty() {
        Some(stripped)
    } else {
        None
    }
}
