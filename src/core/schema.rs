//! The schema contract and the schema set handed to the adapter
//!
//! A [`Schema`] is anything that can look at a raw JSON value and either turn it
//! into a typed output or explain why it can't. The adapter never depends on a
//! particular engine: serde, `validator`, the rule-based
//! [`ObjectSchema`](crate::core::validation::ObjectSchema) or a hand-written
//! closure all plug in through this one trait.
//!
//! [`SchemaSet`] records, in its type, which of body / params / query carry a
//! schema. Unconfigured entries are [`Unset`] and surface as `()` in the
//! handler, so a handler can only read what was actually validated.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ValidationOptions;
use crate::core::error::{Field, Issues};

/// Safe-parse capability: validate and convert a raw value
#[async_trait]
pub trait Schema: Send + Sync + 'static {
    /// Value produced on success
    type Output: Send + 'static;

    /// Validate `input`, never panicking on bad data
    async fn try_parse(&self, input: Value) -> Result<Self::Output, Issues>;
}

#[async_trait]
impl<S: Schema> Schema for Arc<S> {
    type Output = S::Output;

    async fn try_parse(&self, input: Value) -> Result<Self::Output, Issues> {
        (**self).try_parse(input).await
    }
}

/// One entry of a [`SchemaSet`], configured or not
#[async_trait]
pub trait Slot: Send + Sync + 'static {
    /// What the handler receives for this entry
    type Output: Send + 'static;

    /// Stand-in value for an unconfigured entry, `None` when a schema is present
    fn placeholder() -> Option<Self::Output>;

    async fn try_parse(&self, input: Value) -> Result<Self::Output, Issues>;
}

/// Entry without a schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unset;

#[async_trait]
impl Slot for Unset {
    type Output = ();

    fn placeholder() -> Option<()> {
        Some(())
    }

    async fn try_parse(&self, _input: Value) -> Result<(), Issues> {
        Ok(())
    }
}

/// Entry carrying a schema
#[derive(Debug, Clone)]
pub struct Configured<S>(pub S);

#[async_trait]
impl<S: Schema> Slot for Configured<S> {
    type Output = S::Output;

    fn placeholder() -> Option<S::Output> {
        None
    }

    async fn try_parse(&self, input: Value) -> Result<S::Output, Issues> {
        self.0.try_parse(input).await
    }
}

/// Schemas for body, path parameters and query, plus adapter options
///
/// # Usage
///
/// ```rust,ignore
/// let schemas = SchemaSet::new()
///     .body(validated::<NewUser>())
///     .params(deserialize::<UserPath>())
///     .body_message("Invalid user");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaSet<B = Unset, P = Unset, Q = Unset> {
    pub(crate) body: B,
    pub(crate) params: P,
    pub(crate) query: Q,
    pub(crate) options: ValidationOptions,
}

impl SchemaSet {
    /// Empty set: the adapter becomes a pass-through
    pub fn new() -> Self {
        Self {
            body: Unset,
            params: Unset,
            query: Unset,
            options: ValidationOptions::default(),
        }
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P, Q> SchemaSet<B, P, Q> {
    /// Validate the JSON body with `schema`
    pub fn body<S: Schema>(self, schema: S) -> SchemaSet<Configured<S>, P, Q> {
        SchemaSet {
            body: Configured(schema),
            params: self.params,
            query: self.query,
            options: self.options,
        }
    }

    /// Validate the route's path parameters with `schema`
    pub fn params<S: Schema>(self, schema: S) -> SchemaSet<B, Configured<S>, Q> {
        SchemaSet {
            body: self.body,
            params: Configured(schema),
            query: self.query,
            options: self.options,
        }
    }

    /// Validate the flattened query string with `schema`
    pub fn query<S: Schema>(self, schema: S) -> SchemaSet<B, P, Configured<S>> {
        SchemaSet {
            body: self.body,
            params: self.params,
            query: Configured(schema),
            options: self.options,
        }
    }

    /// Replace all options at once
    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn message(mut self, field: Field, message: impl Into<String>) -> Self {
        self.options.messages.set(field, message);
        self
    }

    pub fn body_message(self, message: impl Into<String>) -> Self {
        self.message(Field::Body, message)
    }

    pub fn params_message(self, message: impl Into<String>) -> Self {
        self.message(Field::Params, message)
    }

    pub fn query_message(self, message: impl Into<String>) -> Self {
        self.message(Field::Query, message)
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.options.body_limit = limit;
        self
    }

    pub fn get_options(&self) -> &ValidationOptions {
        &self.options
    }
}
