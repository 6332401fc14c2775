use thiserror::Error;

mod domain_types;
mod ids;
mod rich_text;

pub use domain_types::*;
pub use ids::*;
pub use rich_text::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid Notion ID format: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("{field} out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },
}
