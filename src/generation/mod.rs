// src/generation/mod.rs
//! The generative text service: one-sentence summaries and topical tags.

mod openai;
mod prompts;
mod tags;

pub use openai::OpenAiGenerator;
pub use prompts::PromptTemplates;
pub use tags::parse_tags;

use crate::error::GenerationError;

/// What the pipeline asks of a text generation service.
///
/// Implementations truncate input to `max_input_length` characters before
/// submitting it. Every failure is a [`GenerationError`]; retrying is the
/// caller's job.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// A single-sentence summary in `language`.
    async fn summarize(
        &self,
        text: &str,
        language: &str,
        max_input_length: usize,
    ) -> Result<String, GenerationError>;

    /// At most `max_tags` lowercase, space-free tags, biased toward
    /// reusing `existing_tags`.
    async fn generate_tags(
        &self,
        text: &str,
        max_tags: usize,
        language: &str,
        max_input_length: usize,
        existing_tags: &[String],
    ) -> Result<Vec<String>, GenerationError>;
}
