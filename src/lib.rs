// src/lib.rs
//! notion-curator library: summarizes and tags unprocessed entries of a
//! Notion database.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `GenerationError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `CuratorConfig`, `PropertyNames`
//! - **Domain model**: `Block`, `BlockKind`, `Document`, `TextRun`
//! - **Document store**: `DocumentStore`, `NotionHttpClient`, `BlockFetcher`
//! - **Flattening**: `flatten`, `flatten_all`
//! - **Generation**: `TextGenerator`, `OpenAiGenerator`
//! - **Curation**: `RetryPolicy`, `TagRegistry`, `PageProcessor`, `Scheduler`

pub mod api;
pub mod config;
pub mod constants;
mod error;
mod error_recovery;
pub mod formatting;
pub mod generation;
pub mod model;
mod pipeline;
mod scheduler;
mod tags;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, GenerationError, NotionErrorCode, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, CuratorConfig, PropertyNames};

// --- Domain Model ---
pub use crate::model::{Block, BlockContent, BlockKind, Children, Document, LineBreak};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, DatabaseId, GenerationKey, NotionId, PageId, TextRun,
    ValidatedUrl,
};

// --- Document Store ---
pub use crate::api::types::{
    Cursor, DatabaseSchema, DocumentPatch, DocumentQuery, PaginatedResponse, PropertyUpdate,
};
pub use crate::api::{BlockFetcher, DocumentStore, NotionHttpClient};

// --- Flattening ---
pub use crate::formatting::{flatten, flatten_all};

// --- Generation ---
pub use crate::generation::{parse_tags, OpenAiGenerator, TextGenerator};

// --- Curation ---
pub use crate::error_recovery::{RetryOutcome, RetryPolicy, RetryState};
pub use crate::pipeline::{PageProcessor, ProcessingOutcome, ProcessingSettings, ProcessingStep};
pub use crate::scheduler::{PassReport, Scheduler};
pub use crate::tags::TagRegistry;
