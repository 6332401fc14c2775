// src/pipeline.rs
//! Per-document curation: fetch → flatten → summarize → tag → write back.
//!
//! Failures are absorbed per document and reported as a
//! [`ProcessingOutcome`]. The policy is asymmetric:
//!
//! - a failed write-back is terminal: the document is forced to processed
//!   (best effort) so it is not retried forever, even without a summary;
//! - a failed generation is not: the document stays unprocessed and is
//!   picked up again on the next pass.

use crate::api::types::{DocumentPatch, PropertyUpdate};
use crate::api::{BlockFetcher, DocumentStore};
use crate::config::PropertyNames;
use crate::constants::{
    DEFAULT_LANGUAGE, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MAX_TAGS, NOTION_API_PAGE_SIZE,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::formatting::flatten_all;
use crate::generation::TextGenerator;
use crate::tags::TagRegistry;
use crate::types::{NotionId, PageId};
use std::fmt;
use std::sync::Arc;

/// The step a document was at when processing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStep {
    Fetch,
    Summarize,
    Tag,
    Write,
    MarkProcessed,
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Summarize => "summarize",
            Self::Tag => "tag",
            Self::Write => "write",
            Self::MarkProcessed => "mark-processed",
        };
        f.write_str(name)
    }
}

/// How processing one document ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Summary and tags written, document marked processed.
    Curated { summary: String, tags: Vec<String> },
    /// Nothing to summarize; only the processed flag was written.
    EmptyContent,
    /// Generation failed; the document stays unprocessed.
    GenerationFailed { reason: String },
    /// Write-back failed. `marked_processed` tells whether the follow-up
    /// processed-only write went through.
    WriteFailed {
        reason: String,
        marked_processed: bool,
    },
    /// Any other failure; the document stays unprocessed.
    Failed { step: ProcessingStep, reason: String },
}

impl ProcessingOutcome {
    /// Whether the document will be absent from the next unprocessed listing.
    pub fn leaves_document_processed(&self) -> bool {
        match self {
            Self::Curated { .. } | Self::EmptyContent => true,
            Self::WriteFailed {
                marked_processed, ..
            } => *marked_processed,
            Self::GenerationFailed { .. } | Self::Failed { .. } => false,
        }
    }
}

/// Knobs for generation and retrieval.
#[derive(Debug, Clone)]
pub struct ProcessingSettings {
    pub language: String,
    pub max_tags: usize,
    pub max_input_chars: usize,
    pub page_size: u32,
    pub names: PropertyNames,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            max_tags: DEFAULT_MAX_TAGS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            page_size: NOTION_API_PAGE_SIZE,
            names: PropertyNames::default(),
        }
    }
}

/// Drives one document at a time through the curation steps.
///
/// Construction is two-phase: [`PageProcessor::new`] gives an unready
/// processor, and [`initialize`](PageProcessor::initialize) must load the
/// tag vocabulary before [`process`](PageProcessor::process) is accepted.
pub struct PageProcessor {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn TextGenerator>,
    fetcher: BlockFetcher,
    tags: TagRegistry,
    settings: ProcessingSettings,
    store_retry: RetryPolicy,
    generation_retry: RetryPolicy,
    ready: bool,
}

impl PageProcessor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        settings: ProcessingSettings,
        store_retry: RetryPolicy,
        generation_retry: RetryPolicy,
    ) -> Self {
        let fetcher =
            BlockFetcher::new(Arc::clone(&store), store_retry).with_page_size(settings.page_size);
        let tags = TagRegistry::new(Arc::clone(&store), store_retry);

        Self {
            store,
            generator,
            fetcher,
            tags,
            settings,
            store_retry,
            generation_retry,
            ready: false,
        }
    }

    /// Loads the tag vocabulary. Must succeed before documents are processed.
    pub async fn initialize(&mut self) -> Result<(), AppError> {
        self.tags.load().await?;
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn tag_registry(&self) -> &TagRegistry {
        &self.tags
    }

    /// Processes one document.
    ///
    /// Only misuse is an error ([`AppError::NotInitialized`]); every
    /// processing failure is logged and returned as an outcome.
    pub async fn process(&mut self, id: &PageId) -> Result<ProcessingOutcome, AppError> {
        if !self.ready {
            return Err(AppError::NotInitialized);
        }

        let blocks = match self.fetcher.fetch_children(&NotionId::from(id), true).await {
            Ok(blocks) => blocks,
            Err(e) => {
                log::error!("[{}] {}: {}", id, ProcessingStep::Fetch, e);
                return Ok(ProcessingOutcome::Failed {
                    step: ProcessingStep::Fetch,
                    reason: e.to_string(),
                });
            }
        };

        let text = flatten_all(&blocks);
        log::debug!(
            "[{}] flattened {} block(s) into {} chars",
            id,
            blocks.len(),
            text.chars().count()
        );

        if text.trim().is_empty() {
            return Ok(self.mark_empty(id).await);
        }

        let (summary, tags) = match self.generate(id, &text).await {
            Ok(generated) => generated,
            Err((step, e)) => {
                log::error!("[{}] {}: {}; will retry next pass", id, step, e);
                return Ok(ProcessingOutcome::GenerationFailed {
                    reason: e.to_string(),
                });
            }
        };

        let names = &self.settings.names;
        let patch = DocumentPatch::new()
            .set(names.summary.as_str(), PropertyUpdate::RichText(summary.clone()))
            .set(names.tags.as_str(), PropertyUpdate::MultiSelect(tags.clone()))
            .set(names.processed.as_str(), PropertyUpdate::Checkbox(true));

        if let Err(e) = self.write(id, &patch, "write back").await {
            log::error!("[{}] {}: {}", id, ProcessingStep::Write, e);
            let marked_processed = self.force_processed(id).await;
            return Ok(ProcessingOutcome::WriteFailed {
                reason: e.to_string(),
                marked_processed,
            });
        }

        self.tags.remember(tags.iter().cloned());
        log::info!("[{}] curated with tags [{}]", id, tags.join(", "));
        Ok(ProcessingOutcome::Curated { summary, tags })
    }

    /// Summary, then tags, each under the generation retry policy.
    async fn generate(
        &self,
        id: &PageId,
        text: &str,
    ) -> Result<(String, Vec<String>), (ProcessingStep, AppError)> {
        let generator = self.generator.as_ref();
        let settings = &self.settings;

        let summary = self
            .generation_retry
            .run(&format!("summarize {}", id), || async move {
                generator
                    .summarize(text, &settings.language, settings.max_input_chars)
                    .await
                    .map_err(AppError::from)
            })
            .await
            .map_err(|e| (ProcessingStep::Summarize, e))?;

        let vocabulary = self.tags.vocabulary();
        let existing = vocabulary.as_slice();
        let mut tags = self
            .generation_retry
            .run(&format!("tag {}", id), || async move {
                generator
                    .generate_tags(
                        text,
                        settings.max_tags,
                        &settings.language,
                        settings.max_input_chars,
                        existing,
                    )
                    .await
                    .map_err(AppError::from)
            })
            .await
            .map_err(|e| (ProcessingStep::Tag, e))?;

        if tags.len() > settings.max_tags {
            log::debug!(
                "[{}] generator returned {} tags, keeping {}",
                id,
                tags.len(),
                settings.max_tags
            );
            tags.truncate(settings.max_tags);
        }

        Ok((summary, tags))
    }

    async fn write(&self, id: &PageId, patch: &DocumentPatch, what: &str) -> Result<(), AppError> {
        let store = self.store.as_ref();
        self.store_retry
            .run(&format!("{} {}", what, id), || store.update_document(id, patch))
            .await
            .map(|_| ())
    }

    fn processed_only(&self) -> DocumentPatch {
        DocumentPatch::new().set(
            self.settings.names.processed.as_str(),
            PropertyUpdate::Checkbox(true),
        )
    }

    async fn mark_empty(&self, id: &PageId) -> ProcessingOutcome {
        match self.write(id, &self.processed_only(), "mark empty").await {
            Ok(()) => {
                log::info!("[{}] no text content; marked processed", id);
                ProcessingOutcome::EmptyContent
            }
            Err(e) => {
                log::error!("[{}] {}: {}", id, ProcessingStep::MarkProcessed, e);
                ProcessingOutcome::WriteFailed {
                    reason: e.to_string(),
                    marked_processed: false,
                }
            }
        }
    }

    /// Best-effort follow-up after a failed write-back.
    async fn force_processed(&self, id: &PageId) -> bool {
        match self.write(id, &self.processed_only(), "mark processed").await {
            Ok(()) => {
                log::warn!("[{}] marked processed without summary or tags", id);
                true
            }
            Err(e) => {
                log::error!(
                    "[{}] {}: {}; document may be picked up again",
                    id,
                    ProcessingStep::MarkProcessed,
                    e
                );
                false
            }
        }
    }
}
