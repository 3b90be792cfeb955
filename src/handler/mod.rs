//! Route handlers wrapped with request validation

pub mod with_validation;

pub use with_validation::{Validated, WithValidation, with_validation};
