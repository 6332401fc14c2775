// src/config.rs
use crate::api::types::clamp_page_size;
use crate::constants::{
    DEFAULT_CREATED_PROPERTY, DEFAULT_GENERATION_BASE_URL, DEFAULT_LANGUAGE,
    DEFAULT_MAX_INPUT_CHARS, DEFAULT_MAX_TAGS, DEFAULT_MODEL, DEFAULT_PERSONAL_DESCRIPTION,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PROCESSED_PROPERTY, DEFAULT_SUMMARY_PROPERTY,
    DEFAULT_TAGS_PROPERTY, GENERATION_RETRY_ATTEMPTS, NOTION_API_PAGE_SIZE,
    STORE_RETRY_ATTEMPTS,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::pipeline::ProcessingSettings;
use crate::types::{ApiKey, DatabaseId, GenerationKey, ValidatedUrl, ValidationError};
use clap::Parser;
use std::time::Duration;

/// Parsed command-line input. Secrets come from the environment only.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Notion database ID or URL (falls back to NOTION_DATABASE_ID)
    #[arg(long)]
    pub database: Option<String>,

    /// Chat Completions base URL (falls back to OPENAI_BASE_URL)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Model name (falls back to DEFAULT_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Language summaries and tags are written in
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Seconds between passes
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub interval: u64,

    /// Run a single pass and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Maximum tags written per document
    #[arg(long, default_value_t = DEFAULT_MAX_TAGS)]
    pub max_tags: usize,

    /// Maximum characters of content sent to the model
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_CHARS)]
    pub max_input_chars: usize,

    /// Page size for paginated Notion requests (1-100)
    #[arg(long, default_value_t = NOTION_API_PAGE_SIZE)]
    pub page_size: u32,

    /// Attempts per Notion call
    #[arg(long, default_value_t = STORE_RETRY_ATTEMPTS)]
    pub store_retries: u32,

    /// Attempts per generation call
    #[arg(long, default_value_t = GENERATION_RETRY_ATTEMPTS)]
    pub generation_retries: u32,

    /// Checkbox property marking curated documents
    #[arg(long, default_value = DEFAULT_PROCESSED_PROPERTY)]
    pub processed_property: String,

    /// Rich-text property receiving the summary
    #[arg(long, default_value = DEFAULT_SUMMARY_PROPERTY)]
    pub summary_property: String,

    /// Multi-select property receiving the tags
    #[arg(long, default_value = DEFAULT_TAGS_PROPERTY)]
    pub tags_property: String,

    /// Date property documents are ordered by
    #[arg(long, default_value = DEFAULT_CREATED_PROPERTY)]
    pub created_property: String,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Names of the database properties the curator reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub processed: String,
    pub summary: String,
    pub tags: String,
    pub created: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            processed: DEFAULT_PROCESSED_PROPERTY.to_string(),
            summary: DEFAULT_SUMMARY_PROPERTY.to_string(),
            tags: DEFAULT_TAGS_PROPERTY.to_string(),
            created: DEFAULT_CREATED_PROPERTY.to_string(),
        }
    }
}

/// Resolved configuration, validated and ready to build the curator.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    pub notion_key: ApiKey,
    pub database_id: DatabaseId,
    pub generation_key: GenerationKey,
    pub api_base: ValidatedUrl,
    pub model: String,
    pub personal_description: String,
    pub interval: Duration,
    pub once: bool,
    pub verbose: bool,
    pub store_retry: RetryPolicy,
    pub generation_retry: RetryPolicy,
    pub settings: ProcessingSettings,
}

impl CuratorConfig {
    /// Resolves the configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Same as [`resolve`](Self::resolve), reading variables through `env`.
    pub fn resolve_with<E>(cli: CommandLineInput, env: E) -> Result<Self, AppError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            lookup(name).ok_or_else(|| {
                AppError::MissingConfiguration(format!("{} environment variable not set", name))
            })
        };

        let notion_key = ApiKey::new(required("NOTION_API_KEY")?)?;
        let database = match cli.database {
            Some(database) => database,
            None => required("NOTION_DATABASE_ID")?,
        };
        let database_id = DatabaseId::parse(&database)?;
        let generation_key = GenerationKey::new(required("OPENAI_API_KEY")?)?;

        let api_base = cli
            .api_base
            .or_else(|| lookup("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_GENERATION_BASE_URL.to_string());
        let api_base = ValidatedUrl::parse(&api_base)?;

        let model = cli
            .model
            .or_else(|| lookup("DEFAULT_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let personal_description = lookup("PERSONAL_DESCRIPTION")
            .unwrap_or_else(|| DEFAULT_PERSONAL_DESCRIPTION.to_string());

        at_least_one(cli.interval, "interval")?;
        at_least_one(cli.max_tags as u64, "max tags")?;
        at_least_one(cli.max_input_chars as u64, "max input chars")?;
        if cli.language.trim().is_empty() {
            return Err(ValidationError::EmptyField("language").into());
        }

        let page_size = clamp_page_size(cli.page_size);
        if page_size != cli.page_size {
            log::warn!(
                "Page size {} is outside 1..={}, using {}",
                cli.page_size,
                NOTION_API_PAGE_SIZE,
                page_size
            );
        }

        let names = PropertyNames {
            processed: non_empty(cli.processed_property, "processed property")?,
            summary: non_empty(cli.summary_property, "summary property")?,
            tags: non_empty(cli.tags_property, "tags property")?,
            created: non_empty(cli.created_property, "created property")?,
        };

        Ok(Self {
            notion_key,
            database_id,
            generation_key,
            api_base,
            model,
            personal_description,
            interval: Duration::from_secs(cli.interval),
            once: cli.once,
            verbose: cli.verbose,
            store_retry: RetryPolicy::for_store().with_max_attempts(cli.store_retries),
            generation_retry: RetryPolicy::for_generation()
                .with_max_attempts(cli.generation_retries),
            settings: ProcessingSettings {
                language: cli.language,
                max_tags: cli.max_tags,
                max_input_chars: cli.max_input_chars,
                page_size,
                names,
            },
        })
    }
}

fn at_least_one(value: u64, field: &'static str) -> Result<(), ValidationError> {
    if value == 0 {
        Err(ValidationError::OutOfBounds {
            field,
            value,
            min: 1,
            max: u64::MAX,
        })
    } else {
        Ok(())
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(value)
    }
}
