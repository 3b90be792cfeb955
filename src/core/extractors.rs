//! Raw inputs pulled out of a request before validation
//!
//! This module provides:
//! - [`RouteContext`]: the matched route's path parameters, as an axum extractor
//!   (see [`PathParams`] for absent versus undecodable)
//! - [`read_json_body`]: buffer and JSON-parse a request body
//! - [`flatten_query`]: turn a URI query string into a flat string map

use axum::body::{Body, Bytes};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequestParts, Query, RawPathParams};
use axum::http::Uri;
use axum::http::request::Parts;
use serde_json::{Map, Value};
use std::convert::Infallible;

use crate::core::error::Issues;

/// Path parameters as seen by the router
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PathParams {
    /// The route captured no path parameters
    #[default]
    Absent,
    /// Captured parameters, decoded to strings
    Captured(Map<String, Value>),
    /// The route captured parameters but at least one is not valid UTF-8
    Undecodable(String),
}

/// Routing metadata handed to a validated handler alongside the request
///
/// Only [`PathParams::Absent`] means "no params"; undecodable params are kept
/// apart so they can be rejected instead of skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    params: PathParams,
}

impl RouteContext {
    /// Context without path parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying the given raw path parameters
    pub fn with_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self {
            params: PathParams::Captured(params),
        }
    }

    /// Context for a route whose captured params could not be decoded
    pub fn undecodable(reason: impl Into<String>) -> Self {
        Self {
            params: PathParams::Undecodable(reason.into()),
        }
    }

    /// Decoded params, `None` when absent or undecodable
    pub fn params(&self) -> Option<&Map<String, Value>> {
        match &self.params {
            PathParams::Captured(params) => Some(params),
            _ => None,
        }
    }

    pub fn path_params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_path_params(self) -> PathParams {
        self.params
    }
}

impl<S> FromRequestParts<S> for RouteContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The adapter decides what absent or undecodable params mean.
        let context = match RawPathParams::from_request_parts(parts, state).await {
            Ok(raw) if raw.iter().next().is_some() => RouteContext::with_params(raw.iter()),
            Ok(_) => RouteContext::new(),
            Err(RawPathParamsRejection::InvalidUtf8InPathParam(rejection)) => {
                tracing::debug!(rejection = %rejection.body_text(), "undecodable path parameter");
                RouteContext::undecodable(rejection.body_text())
            }
            Err(rejection) => {
                tracing::trace!(%rejection, "no path parameters on request");
                RouteContext::new()
            }
        };
        Ok(context)
    }
}

/// Why a body could not be turned into JSON
#[derive(Debug)]
pub enum BodyError {
    /// The bytes are not syntactically valid JSON
    Syntax(serde_json::Error),
    /// The body could not be read, or parsing failed for another reason
    Other(Issues),
}

/// Buffer `body` (at most `limit` bytes) and parse it as JSON
///
/// The raw bytes are returned with the value so the body can be restored.
pub async fn read_json_body(body: Body, limit: usize) -> Result<(Value, Bytes), BodyError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| BodyError::Other(Issues::root(format!("failed to read body: {}", e))))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok((value, bytes)),
        Err(e) if e.is_syntax() || e.is_eof() => Err(BodyError::Syntax(e)),
        Err(e) => Err(BodyError::Other(e.into())),
    }
}

/// Flatten the query string of `uri` into `{key: value}`
///
/// Values are always strings. A repeated key keeps its last value.
pub fn flatten_query(uri: &Uri) -> Result<Map<String, Value>, Issues> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|rejection| Issues::root(rejection.body_text()))?;

    let mut flat = Map::new();
    for (key, value) in pairs {
        flat.insert(key, Value::String(value));
    }
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    // === flatten_query() ===

    #[test]
    fn test_flatten_simple_query() {
        let flat = flatten_query(&uri("/search?a=1&b=2")).unwrap();
        assert_eq!(Value::Object(flat), json!({ "a": "1", "b": "2" }));
    }

    #[test]
    fn test_flatten_repeated_key_keeps_last() {
        let flat = flatten_query(&uri("/search?tag=a&tag=b&tag=c")).unwrap();
        assert_eq!(Value::Object(flat), json!({ "tag": "c" }));
    }

    #[test]
    fn test_flatten_decodes_values() {
        let flat = flatten_query(&uri("/search?q=hello%20world&name=a+b&empty=")).unwrap();
        assert_eq!(flat["q"], json!("hello world"));
        assert_eq!(flat["name"], json!("a b"));
        assert_eq!(flat["empty"], json!(""));
    }

    #[test]
    fn test_flatten_without_query() {
        let flat = flatten_query(&uri("/search")).unwrap();
        assert!(flat.is_empty());
    }

    // === read_json_body() ===

    #[tokio::test]
    async fn test_read_valid_json() {
        let (value, bytes) = read_json_body(Body::from(r#"{"name":"Ada"}"#), 1024)
            .await
            .unwrap();
        assert_eq!(value, json!({ "name": "Ada" }));
        assert_eq!(&bytes[..], br#"{"name":"Ada"}"#);
    }

    #[tokio::test]
    async fn test_read_malformed_json_is_syntax_error() {
        let err = read_json_body(Body::from("{not json"), 1024).await.unwrap_err();
        assert!(matches!(err, BodyError::Syntax(_)));
    }

    #[tokio::test]
    async fn test_read_empty_body_is_syntax_error() {
        let err = read_json_body(Body::empty(), 1024).await.unwrap_err();
        assert!(matches!(err, BodyError::Syntax(_)));
    }

    #[tokio::test]
    async fn test_read_oversized_body_is_other_error() {
        let err = read_json_body(Body::from(vec![b' '; 64]), 16).await.unwrap_err();
        assert!(matches!(err, BodyError::Other(_)));
    }

    // === RouteContext ===

    #[test]
    fn test_route_context_with_params() {
        let ctx = RouteContext::with_params([("id", "42")]);
        assert_eq!(ctx.params().unwrap()["id"], json!("42"));
        assert!(RouteContext::new().params().is_none());
    }

    #[test]
    fn test_undecodable_context_exposes_no_params() {
        let ctx = RouteContext::undecodable("Invalid UTF-8 in `id`");
        assert!(ctx.params().is_none());
        assert_ne!(ctx, RouteContext::new());
        assert!(matches!(ctx.path_params(), PathParams::Undecodable(_)));
    }

    #[tokio::test]
    async fn test_route_context_outside_router_has_no_params() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/users/1")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RouteContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx, RouteContext::new());
    }
}
