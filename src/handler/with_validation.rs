//! The validating handler adapter
//!
//! [`with_validation`] wraps a handler so that body, path parameters and query
//! are checked, in that order, before it runs. The first rejection ends the
//! request with a `400 {"message": ...}`; nothing after it is read or parsed.

use axum::body::Body;
use axum::extract::{FromRequestParts, Request};
use axum::handler::Handler;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::config::Messages;
use crate::core::error::{Field, Issues, ValidationFailure};
use crate::core::extractors::{
    BodyError, PathParams, RouteContext, flatten_query, read_json_body,
};
use crate::core::schema::{SchemaSet, Slot};

/// Everything a validated handler receives
///
/// `body` and `query` are `()` when their schema is not configured. `params` is
/// `None` when no params schema is configured, and also when one is configured
/// but the route carried no path parameters: that case is skipped, not rejected.
/// Parameters the route captured but could not decode are rejected.
#[derive(Debug)]
pub struct Validated<B = (), P = (), Q = ()> {
    /// The original request; its body still holds the bytes that were validated
    pub request: Request,
    pub body: B,
    pub params: Option<P>,
    pub query: Q,
}

/// A handler wrapped with schema validation
///
/// Built by [`with_validation`]. Mount it like any axum handler or drive it
/// directly with [`WithValidation::handle`].
pub struct WithValidation<F, B, P, Q> {
    schemas: Arc<SchemaSet<B, P, Q>>,
    handler: F,
}

impl<F: Clone, B, P, Q> Clone for WithValidation<F, B, P, Q> {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            handler: self.handler.clone(),
        }
    }
}

/// Wrap `handler` so it only runs on requests accepted by `schemas`
///
/// # Usage
///
/// ```rust,ignore
/// async fn update_user(
///     Validated { body, params, .. }: Validated<UpdateUser, UserPath>,
/// ) -> impl IntoResponse {
///     // body and params are already validated
/// }
///
/// let app = Router::new().route(
///     "/users/{id}",
///     put(with_validation(
///         SchemaSet::new().body(validated::<UpdateUser>()).params(deserialize::<UserPath>()),
///         update_user,
///     )),
/// );
/// ```
pub fn with_validation<F, Fut, R, B, P, Q>(
    schemas: SchemaSet<B, P, Q>,
    handler: F,
) -> WithValidation<F, B, P, Q>
where
    B: Slot,
    P: Slot,
    Q: Slot,
    F: Fn(Validated<B::Output, P::Output, Q::Output>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send,
    R: IntoResponse,
{
    WithValidation {
        schemas: Arc::new(schemas),
        handler,
    }
}

impl<F, Fut, R, B, P, Q> WithValidation<F, B, P, Q>
where
    B: Slot,
    P: Slot,
    Q: Slot,
    F: Fn(Validated<B::Output, P::Output, Q::Output>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send,
    R: IntoResponse,
{
    /// Validate `request`, then run the wrapped handler or answer 400
    pub async fn handle(&self, request: Request, context: RouteContext) -> Response {
        match self.validate(request, context).await {
            Ok(validated) => (self.handler)(validated).await.into_response(),
            Err(failure) => failure.into_response(),
        }
    }

    /// Run the body → params → query pipeline without invoking the handler
    pub async fn validate(
        &self,
        request: Request,
        context: RouteContext,
    ) -> Result<Validated<B::Output, P::Output, Q::Output>, ValidationFailure> {
        let schemas = &*self.schemas;
        let messages = &schemas.options.messages;
        let (parts, raw_body) = request.into_parts();

        let (body, raw_body) = match B::placeholder() {
            Some(unset) => (unset, raw_body),
            None => {
                let (value, bytes) = match read_json_body(raw_body, schemas.options.body_limit).await
                {
                    Ok(read) => read,
                    Err(BodyError::Syntax(e)) => {
                        tracing::debug!(error = %e, "rejecting request: malformed JSON body");
                        return Err(ValidationFailure::InvalidJson);
                    }
                    Err(BodyError::Other(issues)) => {
                        tracing::debug!(%issues, "rejecting request: unreadable body");
                        return Err(ValidationFailure::rejected(Field::Body, messages, issues));
                    }
                };
                let parsed = schemas
                    .body
                    .try_parse(value)
                    .await
                    .map_err(|issues| reject(Field::Body, messages, issues))?;
                (parsed, Body::from(bytes))
            }
        };
        let request = Request::from_parts(parts, raw_body);

        let params = match P::placeholder() {
            Some(_) => None,
            None => match context.into_path_params() {
                PathParams::Captured(raw) => Some(
                    schemas
                        .params
                        .try_parse(Value::Object(raw))
                        .await
                        .map_err(|issues| reject(Field::Params, messages, issues))?,
                ),
                PathParams::Undecodable(reason) => {
                    return Err(reject(Field::Params, messages, Issues::root(reason)));
                }
                PathParams::Absent => {
                    tracing::trace!("params schema configured but route has no path parameters");
                    None
                }
            },
        };

        let query = match Q::placeholder() {
            Some(unset) => unset,
            None => {
                let flat = flatten_query(request.uri())
                    .map_err(|issues| reject(Field::Query, messages, issues))?;
                schemas
                    .query
                    .try_parse(Value::Object(flat))
                    .await
                    .map_err(|issues| reject(Field::Query, messages, issues))?
            }
        };

        Ok(Validated {
            request,
            body,
            params,
            query,
        })
    }
}

fn reject(field: Field, messages: &Messages, issues: Issues) -> ValidationFailure {
    tracing::debug!(%field, issue_count = issues.len(), %issues, "rejecting request");
    ValidationFailure::rejected(field, messages, issues)
}

impl<F, Fut, R, B, P, Q, S> Handler<(), S> for WithValidation<F, B, P, Q>
where
    B: Slot,
    P: Slot,
    Q: Slot,
    F: Fn(Validated<B::Output, P::Output, Q::Output>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send,
    R: IntoResponse,
    S: Send + Sync + 'static,
{
    type Future = BoxFuture<'static, Response>;

    fn call(self, req: Request, state: S) -> Self::Future {
        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            let context = match RouteContext::from_request_parts(&mut parts, &state).await {
                Ok(context) => context,
                Err(never) => match never {},
            };
            self.handle(Request::from_parts(parts, body), context).await
        })
    }
}
