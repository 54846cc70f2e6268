//! Lenient conversions for rows coming out of the backend.
//!
//! Rows are loosely shaped: numbers arrive as strings, ids arrive as numbers,
//! optional columns arrive as `null`. Everything is coerced here so the rest
//! of the crate works on plain typed values and never fails on a bad field.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Coerce a JSON value to an integer. Anything non-numeric becomes 0.
pub fn coerce_int(value: &Value) -> i64 {
    coerce_opt_int(value).unwrap_or(0)
}

/// Coerce a JSON value to an integer, keeping `None` for null or garbage.
pub fn coerce_opt_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Render an id or label as the string the rest of the crate compares on.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub fn coerce_opt_string(value: &Value) -> Option<String> {
    Some(coerce_string(value)).filter(|s| !s.is_empty())
}

pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}

/// Week keys come back as object keys ("1", "2", ...). Keys that are not
/// positive integers are dropped, as are null labels.
pub fn coerce_weekly_picks(value: &Value) -> BTreeMap<u32, String> {
    let mut picks = BTreeMap::new();
    let Value::Object(map) = value else {
        return picks;
    };
    for (key, label) in map {
        let week = match key.trim().parse::<u32>() {
            Ok(week) if week > 0 => week,
            _ => {
                tracing::warn!(key = %key, "skipping weekly pick with invalid week key");
                continue;
            }
        };
        if let Some(label) = coerce_opt_string(label) {
            picks.insert(week, label);
        }
    }
    picks
}

// serde adapters, used through `#[serde(deserialize_with = "...")]`

pub(crate) fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(coerce_int(&Value::deserialize(d)?))
}

/// Weeks outside `u32` (negative, garbage) become 0, which no lookup uses.
pub(crate) fn lenient_week<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(u32::try_from(coerce_int(&Value::deserialize(d)?)).unwrap_or(0))
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(coerce_string(&Value::deserialize(d)?))
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(coerce_opt_string(&Value::deserialize(d)?))
}
