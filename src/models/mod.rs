pub mod diagnostic;
pub mod enums;

pub use diagnostic::*;
pub use enums::*;

use thiserror::Error;

/// Violations detected while validating a candidate diagnostic structure.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Candidate is not a JSON object")]
    NotAnObject,

    #[error("Invalid or missing fields: {}", .0.join(", "))]
    InvalidFields(Vec<String>),
}
