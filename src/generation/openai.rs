// src/generation/openai.rs
//! OpenAI-compatible Chat Completions client.

use super::prompts::PromptTemplates;
use super::tags::parse_tags;
use super::TextGenerator;
use crate::constants::{
    ERROR_BODY_PREVIEW_LENGTH, GENERATION_REQUEST_TIMEOUT, SUMMARY_MAX_TOKENS,
    SUMMARY_TEMPERATURE, TAGS_MAX_TOKENS, TAGS_TEMPERATURE,
};
use crate::error::GenerationError;
use crate::types::{truncate_chars, GenerationKey, ValidatedUrl};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summaries and tags from any endpoint speaking the Chat Completions API.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: GenerationKey,
    api_base: String,
    model: String,
    personal_description: String,
    prompts: PromptTemplates,
}

impl fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("api_key", &self.api_key)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiGenerator {
    pub fn new(
        api_key: GenerationKey,
        api_base: &ValidatedUrl,
        model: impl Into<String>,
        personal_description: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(GENERATION_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.as_base().to_string(),
            model: model.into(),
            personal_description: personal_description.into(),
            prompts: PromptTemplates::new()?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One single-message completion; returns the trimmed reply.
    async fn complete(
        &self,
        prompt: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            max_tokens,
        };
        let url = format!("{}/chat/completions", self.api_base);
        log::debug!("POST {} (model: {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message: truncate_chars(&body, ERROR_BODY_PREVIEW_LENGTH).to_string(),
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn summarize(
        &self,
        text: &str,
        language: &str,
        max_input_length: usize,
    ) -> Result<String, GenerationError> {
        let prompt = self
            .prompts
            .summary(truncate_chars(text, max_input_length), language)?;
        self.complete(prompt, SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS)
            .await
    }

    async fn generate_tags(
        &self,
        text: &str,
        max_tags: usize,
        language: &str,
        max_input_length: usize,
        existing_tags: &[String],
    ) -> Result<Vec<String>, GenerationError> {
        let prompt = self.prompts.tags(
            truncate_chars(text, max_input_length),
            max_tags,
            language,
            existing_tags,
            &self.personal_description,
        )?;
        let raw = self
            .complete(prompt, TAGS_TEMPERATURE, TAGS_MAX_TOKENS)
            .await?;
        Ok(parse_tags(&raw, max_tags))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
