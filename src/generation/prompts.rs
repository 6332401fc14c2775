// src/generation/prompts.rs
//! Prompt templates for the generation service.
//!
//! Templates are Handlebars with HTML escaping disabled: the output is
//! plain text for a language model, not markup.

use crate::error::GenerationError;
use handlebars::Handlebars;
use serde_json::json;

const SUMMARY_TEMPLATE_NAME: &str = "summary";
const TAGS_TEMPLATE_NAME: &str = "tags";

const SUMMARY_TEMPLATE: &str = "\
Summarize the following content in a single sentence that keeps its key information. \
Write the sentence in {{language}}.

{{content}}";

const TAGS_TEMPLATE: &str = "\
Suggest at most {{max_tags}} specific, meaningful tags for filing and retrieving this article. \
Prefer the key technical concepts, domains and methods it covers; avoid generic or overly broad tags. \
Pick tags from the reader's point of view. \
Answer with the tags only: comma-separated, lowercase, no spaces, in {{language}}.

{{content}}

Example format: tag1,tag2,tag3

Tags already in use (reuse them when they fit): {{#each existing_tags}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}

About the reader: {{description}}";

/// The registered summary and tag prompts.
pub struct PromptTemplates {
    registry: Handlebars<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self, GenerationError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            (SUMMARY_TEMPLATE_NAME, SUMMARY_TEMPLATE),
            (TAGS_TEMPLATE_NAME, TAGS_TEMPLATE),
        ] {
            registry
                .register_template_string(name, template)
                .map_err(|e| GenerationError::Prompt {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self { registry })
    }

    pub fn summary(&self, content: &str, language: &str) -> Result<String, GenerationError> {
        self.render(
            SUMMARY_TEMPLATE_NAME,
            &json!({ "content": content, "language": language }),
        )
    }

    pub fn tags(
        &self,
        content: &str,
        max_tags: usize,
        language: &str,
        existing_tags: &[String],
        description: &str,
    ) -> Result<String, GenerationError> {
        self.render(
            TAGS_TEMPLATE_NAME,
            &json!({
                "content": content,
                "max_tags": max_tags,
                "language": language,
                "existing_tags": existing_tags,
                "description": description,
            }),
        )
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, GenerationError> {
        self.registry
            .render(name, data)
            .map_err(|e| GenerationError::Prompt {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_carries_language_and_raw_content() {
        let prompts = PromptTemplates::new().unwrap();
        let prompt = prompts.summary("a < b && \"c\"", "zh-CN").unwrap();

        assert!(prompt.contains("in zh-CN"));
        assert!(prompt.ends_with("a < b && \"c\""));
    }

    #[test]
    fn tag_prompt_lists_vocabulary_and_reader() {
        let prompts = PromptTemplates::new().unwrap();
        let prompt = prompts
            .tags(
                "body",
                5,
                "en",
                &["rust".to_string(), "ai".to_string()],
                "A systems programmer.",
            )
            .unwrap();

        assert!(prompt.contains("at most 5"));
        assert!(prompt.contains("reuse them when they fit): rust, ai\n"));
        assert!(prompt.ends_with("About the reader: A systems programmer."));
    }
}
