//! Core module containing the schema contract, errors and request extraction

pub mod error;
pub mod extractors;
pub mod schema;
pub mod validation;

pub use error::{ErrorResponse, Field, Issue, Issues, ValidationFailure};
pub use extractors::{PathParams, RouteContext};
pub use schema::{Configured, Schema, SchemaSet, Slot, Unset};
