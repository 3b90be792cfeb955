//! Schemas backed by Rust types
//!
//! These let a handler receive its own structs instead of raw JSON:
//! [`SerdeSchema`] only deserializes, [`ValidatorSchema`] also runs the
//! `validator` derive rules, and [`FnSchema`] wraps any closure.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use validator::Validate;

use crate::core::error::Issues;
use crate::core::schema::Schema;

/// Deserialize into `T` with serde
pub struct SerdeSchema<T>(PhantomData<fn() -> T>);

/// Deserialize into `T`, then check `T`'s `#[validate(...)]` rules
pub struct ValidatorSchema<T>(PhantomData<fn() -> T>);

/// Closure-backed schema
pub struct FnSchema<F>(F);

/// Schema that deserializes into `T`
pub fn deserialize<T: DeserializeOwned + Send + 'static>() -> SerdeSchema<T> {
    SerdeSchema(PhantomData)
}

/// Schema that deserializes into `T` and runs its validator rules
pub fn validated<T: DeserializeOwned + Validate + Send + 'static>() -> ValidatorSchema<T> {
    ValidatorSchema(PhantomData)
}

/// Schema from a closure returning the parsed value or its issues
pub fn from_fn<F, T>(f: F) -> FnSchema<F>
where
    F: Fn(Value) -> Result<T, Issues> + Send + Sync + 'static,
    T: Send + 'static,
{
    FnSchema(f)
}

// Manual impls: deriving would wrongly require `T: Clone`/`T: Debug`
impl<T> Clone for SerdeSchema<T> {
    fn clone(&self) -> Self {
        SerdeSchema(PhantomData)
    }
}

impl<T> Clone for ValidatorSchema<T> {
    fn clone(&self) -> Self {
        ValidatorSchema(PhantomData)
    }
}

impl<T> fmt::Debug for SerdeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerdeSchema<{}>", std::any::type_name::<T>())
    }
}

impl<T> fmt::Debug for ValidatorSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorSchema<{}>", std::any::type_name::<T>())
    }
}

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSchema")
    }
}

#[async_trait]
impl<T> Schema for SerdeSchema<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    async fn try_parse(&self, input: Value) -> Result<T, Issues> {
        Ok(serde_json::from_value(input)?)
    }
}

#[async_trait]
impl<T> Schema for ValidatorSchema<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Output = T;

    async fn try_parse(&self, input: Value) -> Result<T, Issues> {
        let value: T = serde_json::from_value(input)?;
        value.validate()?;
        Ok(value)
    }
}

#[async_trait]
impl<F, T> Schema for FnSchema<F>
where
    F: Fn(Value) -> Result<T, Issues> + Send + Sync + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn try_parse(&self, input: Value) -> Result<T, Issues> {
        (self.0)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        page: String,
        #[serde(default)]
        sort: Option<String>,
    }

    #[derive(Debug, Deserialize, Validate, PartialEq)]
    struct NewUser {
        #[validate(length(min = 1, max = 50))]
        name: String,
        #[validate(email(message = "not an email"))]
        email: String,
    }

    #[test]
    fn test_serde_schema_parses() {
        let schema = deserialize::<Paging>();
        let out = tokio_test::block_on(schema.try_parse(json!({ "page": "2" }))).unwrap();
        assert_eq!(
            out,
            Paging {
                page: "2".to_string(),
                sort: None
            }
        );
    }

    #[test]
    fn test_serde_schema_reports_shape_errors() {
        let schema = deserialize::<Paging>();
        let issues = tokio_test::block_on(schema.try_parse(json!({ "sort": "asc" }))).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues.to_string().contains("missing field `page`"));
    }

    #[test]
    fn test_validator_schema_runs_rules() {
        let schema = validated::<NewUser>();
        let issues = tokio_test::block_on(
            schema.try_parse(json!({ "name": "Ada", "email": "nope" })),
        )
        .unwrap_err();
        assert_eq!(issues.at("email").next().unwrap().message, "not an email");

        let ok = tokio_test::block_on(
            schema.try_parse(json!({ "name": "Ada", "email": "ada@example.com" })),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_validator_schema_reports_serde_errors_first() {
        let schema = validated::<NewUser>();
        let issues = tokio_test::block_on(schema.try_parse(json!({ "name": 3 }))).unwrap_err();
        assert_eq!(issues.iter().next().unwrap().path, "");
    }

    #[test]
    fn test_fn_schema() {
        let schema = from_fn(|v: Value| {
            v.as_str()
                .map(str::len)
                .ok_or_else(|| Issues::root("expected a string"))
        });
        assert_eq!(tokio_test::block_on(schema.try_parse(json!("abc"))), Ok(3));
        assert!(tokio_test::block_on(schema.try_parse(json!(1))).is_err());
    }

    #[test]
    fn test_debug_names_the_type() {
        let debug = format!("{:?}", deserialize::<Paging>());
        assert!(debug.contains("Paging"));
    }
}
