//! Typed errors for request validation
//!
//! Two layers live here:
//!
//! - [`Issues`]: what a [`Schema`](crate::core::schema::Schema) reports when it
//!   rejects an input. Issues are meant for logs and for callers driving schemas
//!   directly; they never reach the HTTP client.
//! - [`ValidationFailure`]: why the adapter refused a request. Every variant is
//!   rendered as `400 Bad Request` with a JSON body `{"message": "..."}`.
//!
//! # Example
//!
//! ```rust,ignore
//! use this_validation::prelude::*;
//!
//! match failure {
//!     ValidationFailure::InvalidJson => println!("client sent garbage"),
//!     ValidationFailure::Body { issues, .. } => println!("{} body issues", issues.len()),
//!     other => println!("rejected: {}", other),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::ValidationErrorsKind;

use crate::config::Messages;

/// Message sent when the body is not syntactically valid JSON
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON in body";

/// A single problem found by a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending value, empty for the input root
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Issue attached to the whole input rather than one field
    pub fn root(message: impl Into<String>) -> Self {
        Self::new("", message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue a schema found in one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
#[error("{}", join_issues(.0))]
pub struct Issues(Vec<Issue>);

fn join_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "invalid input".to_string();
    }
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single issue on the input root
    pub fn root(message: impl Into<String>) -> Self {
        Self(vec![Issue::root(message)])
    }

    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    /// Issues reported for one path
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.0.iter().filter(move |issue| issue.path == path)
    }

    /// `Ok(value)` when nothing was reported
    pub fn into_result<T>(self, value: T) -> Result<T, Issues> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<Issue> for Issues {
    fn from(issue: Issue) -> Self {
        Self(vec![issue])
    }
}

impl From<Vec<Issue>> for Issues {
    fn from(issues: Vec<Issue>) -> Self {
        Self(issues)
    }
}

impl FromIterator<Issue> for Issues {
    fn from_iter<I: IntoIterator<Item = Issue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<serde_json::Error> for Issues {
    fn from(err: serde_json::Error) -> Self {
        Self::root(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Issues {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues = Vec::new();
        collect_validator_issues(&errors, "", &mut issues);
        // errors() is a HashMap; keep output stable for logs and tests
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        Self(issues)
    }
}

/// Flatten nested validator errors into `inner.name` / `items[2].qty` paths
fn collect_validator_issues(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut Vec<Issue>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(Issue::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validator_issues(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validator_issues(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// The three request inputs the adapter can validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Body,
    Params,
    Query,
}

impl Field {
    /// Message used when no override is configured
    pub fn default_message(self) -> &'static str {
        match self {
            Field::Body => "Bad Request",
            Field::Params => "Bad Request Parameters",
            Field::Query => "Bad Request Query",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Params => "params",
            Field::Query => "query",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the adapter refused a request
#[derive(Debug, Clone, Error)]
pub enum ValidationFailure {
    /// The body is not syntactically valid JSON
    #[error("{}", INVALID_JSON_MESSAGE)]
    InvalidJson,

    /// The body could not be read or was rejected by its schema
    #[error("{message}")]
    Body { message: String, issues: Issues },

    /// The path parameters were rejected by their schema
    #[error("{message}")]
    Params { message: String, issues: Issues },

    /// The flattened query string was rejected by its schema
    #[error("{message}")]
    Query { message: String, issues: Issues },
}

impl ValidationFailure {
    /// Build the failure for `field`, resolving its message against `messages`
    pub fn rejected(field: Field, messages: &Messages, issues: Issues) -> Self {
        let message = messages.resolve(field).to_string();
        match field {
            Field::Body => ValidationFailure::Body { message, issues },
            Field::Params => ValidationFailure::Params { message, issues },
            Field::Query => ValidationFailure::Query { message, issues },
        }
    }

    /// Which input failed
    pub fn field(&self) -> Field {
        match self {
            ValidationFailure::InvalidJson | ValidationFailure::Body { .. } => Field::Body,
            ValidationFailure::Params { .. } => Field::Params,
            ValidationFailure::Query { .. } => Field::Query,
        }
    }

    /// Message sent to the client
    pub fn message(&self) -> &str {
        match self {
            ValidationFailure::InvalidJson => INVALID_JSON_MESSAGE,
            ValidationFailure::Body { message, .. }
            | ValidationFailure::Params { message, .. }
            | ValidationFailure::Query { message, .. } => message,
        }
    }

    /// Schema issues behind the failure, if any
    pub fn issues(&self) -> Option<&Issues> {
        match self {
            ValidationFailure::InvalidJson => None,
            ValidationFailure::Body { issues, .. }
            | ValidationFailure::Params { issues, .. }
            | ValidationFailure::Query { issues, .. } => Some(issues),
        }
    }

    /// Always `400 Bad Request`
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message().to_string(),
        }
    }
}

/// JSON body of every adapter-produced response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_error_response())).into_response()
    }
}
