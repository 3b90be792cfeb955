//! Bundled schema engines
//!
//! The adapter only knows the [`Schema`](crate::core::schema::Schema) trait;
//! this module ships ready-made implementations of it:
//!
//! - [`typed`]: serde and `validator` backed schemas for your own structs
//! - [`ObjectSchema`]: declarative field filters and rules over raw JSON
//!   (see [`filters`] and [`validators`])

pub mod filters;
pub mod object;
pub mod typed;
pub mod validators;

pub use object::{FieldSchema, ObjectSchema};
pub use typed::{FnSchema, SerdeSchema, ValidatorSchema, deserialize, from_fn, validated};
