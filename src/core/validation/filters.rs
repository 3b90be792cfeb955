//! Reusable field filters
//!
//! Filters run before rules and may rewrite a value. Query strings and path
//! parameters only ever carry strings, so the coercing filters (`to_number`,
//! `to_bool`) are what let a rule like `min_value` see a number.

use anyhow::{Result, anyhow};
use serde_json::{Number, Value, json};

/// Filter: trim surrounding whitespace
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        other => Ok(other),
    }
}

/// Filter: convert string to uppercase
pub fn uppercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        other => Ok(other),
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        other => Ok(other),
    }
}

/// Filter: round number to `decimals` places
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| match value.as_f64() {
        Some(num) if !value.is_i64() && !value.is_u64() => {
            let factor = 10_f64.powi(decimals as i32);
            Ok(json!((num * factor).round() / factor))
        }
        _ => Ok(value),
    }
}

/// Filter: parse a numeric string into a JSON number
///
/// Integers stay integers. Anything that is not a number fails.
pub fn to_number() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |field: &str, value: Value| {
        let Value::String(s) = &value else {
            return Ok(value);
        };
        let s = s.trim();
        if let Ok(int) = s.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        s.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| anyhow!("'{}' must be a number (got {})", field, s))
    }
}

/// Filter: parse `true`/`false`/`1`/`0` into a JSON boolean
pub fn to_bool() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |field: &str, value: Value| {
        let Value::String(s) = &value else {
            return Ok(value);
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(anyhow!("'{}' must be a boolean (got {})", field, s)),
        }
    }
}

/// Filter: substitute `default` for a missing or null value
pub fn default_value(default: Value) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| {
        if value.is_null() {
            Ok(default.clone())
        } else {
            Ok(value)
        }
    }
}
