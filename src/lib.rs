//! # This-Validation
//!
//! Schema-validated route handlers for axum.
//!
//! Wrap a handler with [`with_validation`](handler::with_validation) and give it
//! schemas for the request body, the path parameters and the query string. The
//! wrapper checks them in that order and answers `400 {"message": ...}` on the
//! first rejection; otherwise your handler runs with the parsed values.
//!
//! ## Features
//!
//! - **Engine-agnostic**: anything implementing [`Schema`](core::schema::Schema) plugs in
//! - **Typed handlers**: unconfigured inputs are `()`, configured ones are your types
//! - **Bundled schemas**: serde, `validator` derive, closures, and a rule-based object schema
//! - **Configurable messages**: per-input overrides, loadable from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_validation::prelude::*;
//!
//! #[derive(Deserialize, Validate)]
//! struct NewUser {
//!     #[validate(length(min = 1))]
//!     name: String,
//! }
//!
//! async fn create_user(Validated { body, .. }: Validated<NewUser>) -> impl IntoResponse {
//!     (StatusCode::CREATED, body.name)
//! }
//!
//! let app = Router::new().route(
//!     "/users",
//!     post(with_validation(SchemaSet::new().body(validated::<NewUser>()), create_user)),
//! );
//! ```

pub mod config;
pub mod core;
pub mod handler;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ErrorResponse, Field, Issue, Issues, ValidationFailure},
        extractors::{PathParams, RouteContext},
        schema::{Configured, Schema, SchemaSet, Slot, Unset},
    };

    // === Schemas ===
    pub use crate::core::validation::{
        FieldSchema, FnSchema, ObjectSchema, SerdeSchema, ValidatorSchema, deserialize, filters,
        from_fn, validated, validators,
    };

    // === Handler ===
    pub use crate::handler::{Validated, WithValidation, with_validation};

    // === Config ===
    pub use crate::config::{Messages, ValidationOptions};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use validator::Validate;

    // === Axum ===
    pub use axum::{
        Router,
        http::StatusCode,
        response::IntoResponse,
        routing::{delete, get, patch, post, put},
    };
}
