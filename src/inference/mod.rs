pub mod engine;
pub mod gemini;
pub mod parser;
pub mod prompt;

pub use engine::*;
pub use gemini::*;
pub use parser::*;
pub use prompt::*;

use thiserror::Error;

use crate::models::SchemaError;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("AI provider not reachable at {0}")]
    Connection(String),

    #[error("AI provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Empty image upload")]
    EmptyImage,

    #[error("Provider response carried no candidate text")]
    EmptyResponse,

    #[error("No JSON found in provider response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Schema violation in provider response: {0}")]
    Schema(#[from] SchemaError),
}
