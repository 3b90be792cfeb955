//! Reusable field rules
//!
//! Rules are plain closures `(field, value) -> Result<(), message>`. A rule only
//! judges values of the kind it understands and lets anything else through, so
//! `string_length` never complains about a number; pair rules with `required`
//! when presence matters.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Rule: field is required (present and not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Rule: number must be strictly positive
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num <= 0.0 => Err(format!("'{}' must be positive (got {})", field, num)),
        _ => Ok(()),
    }
}

/// Rule: string length, in characters, must be within `min..=max`
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!(
                "'{}' must be at least {} characters (got {})",
                field, min, len
            ))
        } else if len > max {
            Err(format!(
                "'{}' must be at most {} characters (got {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Rule: number must be at least `min`
pub fn min_value(min: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num < min => Err(format!(
            "'{}' must be at least {} (got {})",
            field, min, num
        )),
        _ => Ok(()),
    }
}

/// Rule: number must not exceed `max`
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num > max => Err(format!(
            "'{}' must not exceed {} (got {})",
            field, max, num
        )),
        _ => Ok(()),
    }
}

/// Rule: string must be one of `allowed`
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        if allowed.iter().any(|a| a == s) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be one of {:?} (got {})",
                field, allowed, s
            ))
        }
    }
}

/// Rule: string must parse as a date in `format` (chrono syntax)
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        match chrono::NaiveDate::parse_from_str(s, format) {
            Ok(_) => Ok(()),
            Err(_) => Err(format!(
                "'{}' must use the date format {} (got {})",
                field, format, s
            )),
        }
    }
}

/// Rule: string must match `regex`
pub fn pattern(regex: Regex) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        if regex.is_match(s) {
            Ok(())
        } else {
            Err(format!("'{}' must match {}", field, regex.as_str()))
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

/// Rule: string must look like an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        if email_regex().is_match(s) {
            Ok(())
        } else {
            Err(format!("'{}' must be a valid email address (got {})", field, s))
        }
    }
}
