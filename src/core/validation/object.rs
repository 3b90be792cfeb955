//! Rule-based object schema
//!
//! Declares the fields an object may carry, each with filters (run first, in
//! order) and rules (all run, all failures collected). Keys that were not
//! declared are dropped unless [`ObjectSchema::passthrough`] is set.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::validators;
use crate::core::error::{Issue, Issues};
use crate::core::schema::Schema;

type Rule = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type Filter = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

/// Filters and rules for one field
#[derive(Clone, Default)]
pub struct FieldSchema {
    required: bool,
    filters: Vec<Filter>,
    rules: Vec<Rule>,
}

impl FieldSchema {
    /// Optional field without rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and non-null after filtering
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn rule<R>(mut self, rule: R) -> Self
    where
        R: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn apply(&self, name: &str, raw: Value, issues: &mut Issues) -> Option<Value> {
        let mut value = raw;
        for filter in &self.filters {
            match filter(name, value) {
                Ok(next) => value = next,
                Err(e) => {
                    issues.push(Issue::new(name, e.to_string()));
                    return None;
                }
            }
        }

        if value.is_null() {
            if self.required {
                if let Err(message) = validators::required()(name, &value) {
                    issues.push(Issue::new(name, message));
                }
            }
            return None;
        }

        let before = issues.len();
        for rule in &self.rules {
            if let Err(message) = rule(name, &value) {
                issues.push(Issue::new(name, message));
            }
        }
        (issues.len() == before).then_some(value)
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("required", &self.required)
            .field("filters", &self.filters.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Object schema built from declared fields
///
/// # Usage
///
/// ```rust,ignore
/// let user = ObjectSchema::new()
///     .field("name", FieldSchema::new().required().filter(trim()).rule(string_length(1, 50)))
///     .field("email", FieldSchema::new().required().filter(lowercase()).rule(email()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
    passthrough: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`; declaring it again replaces the earlier definition
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    /// Keep undeclared keys in the output, unchecked
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Filter then validate `payload`, returning the cleaned object
    pub fn validate_and_filter(&self, payload: Value) -> Result<Map<String, Value>, Issues> {
        let Value::Object(mut input) = payload else {
            return Err(Issues::root(format!(
                "expected an object, got {}",
                kind_of(&payload)
            )));
        };

        let mut issues = Issues::new();
        let mut output = Map::new();

        for (name, field) in &self.fields {
            let raw = input.remove(name).unwrap_or(Value::Null);
            if let Some(value) = field.apply(name, raw, &mut issues) {
                output.insert(name.clone(), value);
            }
        }

        if self.passthrough {
            output.extend(input);
        }

        issues.into_result(output)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl Schema for ObjectSchema {
    type Output = Map<String, Value>;

    async fn try_parse(&self, input: Value) -> Result<Self::Output, Issues> {
        self.validate_and_filter(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::filters::{lowercase, to_number, trim};
    use crate::core::validation::validators::{email, min_value, string_length};
    use serde_json::json;

    fn user_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(
                "name",
                FieldSchema::new()
                    .required()
                    .filter(trim())
                    .rule(string_length(2, 20)),
            )
            .field(
                "email",
                FieldSchema::new().required().filter(lowercase()).rule(email()),
            )
            .field("age", FieldSchema::new().rule(min_value(0.0)))
    }

    #[test]
    fn test_valid_payload_is_filtered() {
        let out = user_schema()
            .validate_and_filter(json!({ "name": "  Ada ", "email": "ADA@Example.com" }))
            .unwrap();
        assert_eq!(Value::Object(out), json!({ "name": "Ada", "email": "ada@example.com" }));
    }

    #[test]
    fn test_unknown_keys_are_stripped() {
        let out = user_schema()
            .validate_and_filter(json!({ "name": "Ada", "email": "a@b.io", "admin": true }))
            .unwrap();
        assert!(!out.contains_key("admin"));
    }

    #[test]
    fn test_passthrough_keeps_unknown_keys() {
        let out = user_schema()
            .passthrough()
            .validate_and_filter(json!({ "name": "Ada", "email": "a@b.io", "admin": true }))
            .unwrap();
        assert_eq!(out["admin"], json!(true));
    }

    #[test]
    fn test_all_failures_are_collected() {
        let issues = user_schema()
            .validate_and_filter(json!({ "name": "A", "age": -1 }))
            .unwrap_err();
        assert_eq!(issues.len(), 3);
        assert!(issues.at("name").next().unwrap().message.contains("at least 2"));
        assert_eq!(issues.at("email").next().unwrap().message, "'email' is required");
        assert!(issues.at("age").next().is_some());
    }

    #[test]
    fn test_null_counts_as_missing() {
        let issues = user_schema()
            .validate_and_filter(json!({ "name": null, "email": "a@b.io" }))
            .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.iter().next().unwrap().path, "name");
    }

    #[test]
    fn test_optional_missing_field_skips_rules() {
        let out = user_schema()
            .validate_and_filter(json!({ "name": "Ada", "email": "a@b.io" }))
            .unwrap();
        assert!(!out.contains_key("age"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let issues = user_schema().validate_and_filter(json!([1, 2])).unwrap_err();
        assert_eq!(issues.iter().next().unwrap().message, "expected an object, got an array");
    }

    #[test]
    fn test_filter_failure_becomes_issue() {
        let schema = ObjectSchema::new().field(
            "page",
            FieldSchema::new().filter(to_number()).rule(min_value(1.0)),
        );
        let issues = schema.validate_and_filter(json!({ "page": "one" })).unwrap_err();
        assert!(issues.iter().next().unwrap().message.contains("must be a number"));

        let out = schema.validate_and_filter(json!({ "page": "3" })).unwrap();
        assert_eq!(out["page"], json!(3));
    }

    #[test]
    fn test_redeclared_field_replaces() {
        let schema = ObjectSchema::new()
            .field("id", FieldSchema::new().required())
            .field("id", FieldSchema::new());
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["id"]);
        assert!(schema.validate_and_filter(json!({})).is_ok());
    }

    #[tokio::test]
    async fn test_schema_impl() {
        let out = user_schema()
            .try_parse(json!({ "name": "Ada", "email": "a@b.io" }))
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
    }
}
