// src/scheduler.rs
//! The poll loop: list unprocessed documents, process them one by one,
//! sleep, repeat.

use crate::api::types::DocumentQuery;
use crate::api::DocumentStore;
use crate::config::PropertyNames;
use crate::error_recovery::RetryPolicy;
use crate::pipeline::{PageProcessor, ProcessingOutcome};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Counts for one pass over the unprocessed documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub listed: usize,
    pub curated: usize,
    pub empty: usize,
    pub generation_failed: usize,
    pub write_failed: usize,
    pub failed: usize,
    /// Set when the pass was skipped before any document was processed.
    pub skipped: Option<String>,
}

impl PassReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Curated { .. } => self.curated += 1,
            ProcessingOutcome::EmptyContent => self.empty += 1,
            ProcessingOutcome::GenerationFailed { .. } => self.generation_failed += 1,
            ProcessingOutcome::WriteFailed { .. } => self.write_failed += 1,
            ProcessingOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.skipped {
            return write!(f, "pass skipped: {}", reason);
        }
        write!(
            f,
            "{} listed, {} curated, {} empty, {} generation failures, {} write failures, {} other failures",
            self.listed,
            self.curated,
            self.empty,
            self.generation_failed,
            self.write_failed,
            self.failed
        )
    }
}

/// Repeatedly drives the processor over the current unprocessed batch.
pub struct Scheduler {
    store: Arc<dyn DocumentStore>,
    processor: PageProcessor,
    query: DocumentQuery,
    retry: RetryPolicy,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        processor: PageProcessor,
        names: &PropertyNames,
        page_size: u32,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            processor,
            query: DocumentQuery::unprocessed(&names.processed, &names.created, page_size),
            retry,
        }
    }

    pub fn processor(&self) -> &PageProcessor {
        &self.processor
    }

    /// One pass. Never fails: listing or initialization errors skip the pass.
    pub async fn run_pass(&mut self) -> PassReport {
        if !self.processor.is_ready() {
            if let Err(e) = self.processor.initialize().await {
                log::error!("Could not load tag vocabulary, skipping pass: {}", e);
                return PassReport::skipped(e.to_string());
            }
        }

        let store = self.store.as_ref();
        let query = &self.query;
        let documents = match self
            .retry
            .run("list unprocessed documents", || store.query_documents(query))
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                log::error!("Could not list unprocessed documents, skipping pass: {}", e);
                return PassReport::skipped(e.to_string());
            }
        };

        let mut report = PassReport {
            listed: documents.len(),
            ..Default::default()
        };
        log::info!("Found {} unprocessed document(s)", documents.len());

        for document in &documents {
            match self.processor.process(&document.id).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    log::error!("[{}] not processed: {}", document.id, e);
                    report.failed += 1;
                }
            }
        }

        log::info!("Pass complete: {}", report);
        report
    }

    /// Runs passes forever, `interval` apart, until Ctrl-C.
    ///
    /// Ctrl-C during a pass abandons the document in flight; whatever it
    /// already wrote stays written.
    pub async fn run(&mut self, interval: Duration) {
        log::info!("Polling every {}s; press Ctrl-C to stop", interval.as_secs());

        loop {
            tokio::select! {
                _ = self.run_pass() => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted during a pass, shutting down");
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, shutting down");
                    return;
                }
            }
        }
    }
}
