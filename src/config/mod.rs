//! Adapter options and their loading

use crate::core::error::Field;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default cap on the body the adapter buffers, same as axum's own default
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Per-field overrides for the 400 message
///
/// The malformed JSON message is fixed and cannot be overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Messages {
    /// Override for `field`, or its default message
    pub fn resolve(&self, field: Field) -> &str {
        let custom = match field {
            Field::Body => self.body.as_deref(),
            Field::Params => self.params.as_deref(),
            Field::Query => self.query.as_deref(),
        };
        custom.unwrap_or_else(|| field.default_message())
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        let slot = match field {
            Field::Body => &mut self.body,
            Field::Params => &mut self.params,
            Field::Query => &mut self.query,
        };
        *slot = Some(message.into());
    }
}

/// Everything about the adapter that is not a schema
///
/// ```yaml
/// messages:
///   body: "Invalid user payload"
///   query: "Invalid paging"
/// body_limit: 65536
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    #[serde(default)]
    pub messages: Messages,

    /// Largest body, in bytes, read before validation gives up
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            messages: Messages::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ValidationOptions {
    /// Load options from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load options from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ValidationOptions::default();
        assert_eq!(options.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(options.messages, Messages::default());
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let messages = Messages {
            body: Some("Invalid user".to_string()),
            ..Messages::default()
        };
        assert_eq!(messages.resolve(Field::Body), "Invalid user");
        assert_eq!(messages.resolve(Field::Params), "Bad Request Parameters");
        assert_eq!(messages.resolve(Field::Query), "Bad Request Query");
    }

    #[test]
    fn test_set_message() {
        let mut messages = Messages::default();
        messages.set(Field::Params, "unknown user id");
        assert_eq!(messages.params.as_deref(), Some("unknown user id"));
    }

    #[test]
    fn test_yaml_partial_config() {
        let options = ValidationOptions::from_yaml_str("messages:\n  query: bad paging\n").unwrap();
        assert_eq!(options.messages.query.as_deref(), Some("bad paging"));
        assert_eq!(options.messages.body, None);
        assert_eq!(options.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn test_yaml_serialization() {
        let mut options = ValidationOptions::default();
        options.messages.set(Field::Body, "nope");
        options.body_limit = 1024;

        let yaml = serde_yaml::to_string(&options).unwrap();
        let parsed = ValidationOptions::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_yaml_rejects_unknown_shape() {
        assert!(ValidationOptions::from_yaml_str("body_limit: lots").is_err());
    }
}
