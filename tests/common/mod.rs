// tests/common/mod.rs
//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use notion_curator::{
    AppError, Block, Cursor, DatabaseSchema, Document, DocumentPatch, DocumentQuery,
    DocumentStore, GenerationError, NotionId, PageId, PaginatedResponse, PropertyUpdate,
    RetryPolicy, TextGenerator,
};
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A retry policy that waits milliseconds instead of seconds.
pub fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(4))
}

/// A deterministic 32-hex page ID.
pub fn page_id(n: u32) -> PageId {
    PageId::parse(&format!("{:032x}", 0xa000_0000u64 + n as u64)).unwrap()
}

/// A deterministic 32-hex block ID.
pub fn block_id(n: u32) -> notion_curator::BlockId {
    notion_curator::BlockId::parse(&format!("{:032x}", 0xb000_0000u64 + n as u64)).unwrap()
}

pub fn not_found() -> AppError {
    AppError::notion(
        StatusCode::NOT_FOUND,
        "object_not_found",
        "Could not find block",
    )
}

#[derive(Default)]
struct StoreState {
    documents: Vec<Document>,
    children: HashMap<String, Vec<Block>>,
    tag_options: Vec<String>,
    failing_parents: HashSet<String>,
    rate_limits: HashMap<String, u32>,
    rejected_property: Option<String>,
    reject_all_updates: bool,
    failing_schema: bool,
    failing_query: bool,
    updates: Vec<(PageId, DocumentPatch)>,
    children_requests: Vec<(String, Option<Cursor>)>,
}

/// A Notion database in memory.
///
/// Child collections are served in pages of the requested size, with the
/// cursor being the index of the next item.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, document: Document) -> Self {
        self.state.lock().unwrap().documents.push(document);
        self
    }

    pub fn with_children(self, parent: impl Into<NotionId>, children: Vec<Block>) -> Self {
        let key = parent.into().as_str().to_string();
        self.state.lock().unwrap().children.insert(key, children);
        self
    }

    pub fn with_tag_options(self, options: &[&str]) -> Self {
        self.state.lock().unwrap().tag_options = options.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Child requests for `parent` fail permanently.
    pub fn with_failing_parent(self, parent: impl Into<NotionId>) -> Self {
        let key = parent.into().as_str().to_string();
        self.state.lock().unwrap().failing_parents.insert(key);
        self
    }

    /// The next `times` child requests for `parent` are rate limited.
    pub fn with_rate_limit(self, parent: impl Into<NotionId>, times: u32) -> Self {
        let key = parent.into().as_str().to_string();
        self.state.lock().unwrap().rate_limits.insert(key, times);
        self
    }

    /// Updates touching `property` are rejected.
    pub fn rejecting_updates_to(self, property: &str) -> Self {
        self.state.lock().unwrap().rejected_property = Some(property.to_string());
        self
    }

    pub fn rejecting_all_updates(self) -> Self {
        self.state.lock().unwrap().reject_all_updates = true;
        self
    }

    pub fn with_failing_schema(self) -> Self {
        self.state.lock().unwrap().failing_schema = true;
        self
    }

    pub fn with_failing_query(self) -> Self {
        self.state.lock().unwrap().failing_query = true;
        self
    }

    pub fn updates(&self) -> Vec<(PageId, DocumentPatch)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn document(&self, id: &PageId) -> Option<Document> {
        self.state
            .lock()
            .unwrap()
            .documents
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    /// Number of child requests made for `parent`, including failed ones.
    pub fn children_requests_for(&self, parent: impl Into<NotionId>) -> usize {
        let key = parent.into().as_str().to_string();
        self.state
            .lock()
            .unwrap()
            .children_requests
            .iter()
            .filter(|(p, _)| *p == key)
            .count()
    }
}

#[async_trait::async_trait]
impl DocumentStore for FakeStore {
    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        let state = self.state.lock().unwrap();
        if state.failing_query {
            return Err(AppError::notion(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Could not find property",
            ));
        }

        let mut matching: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| match query.checkbox_filter() {
                Some((_, equals)) => d.processed == equals,
                None => true,
            })
            .cloned()
            .collect();
        // Newest first, like the unprocessed listing.
        matching.sort_by(|a, b| b.created.cmp(&a.created));
        matching.truncate(query.page_size as usize);
        Ok(matching)
    }

    async fn get_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<&Cursor>,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        let mut state = self.state.lock().unwrap();
        let key = parent.as_str().to_string();
        state.children_requests.push((key.clone(), cursor.cloned()));

        if let Some(remaining) = state.rate_limits.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::rate_limited());
            }
        }
        if state.failing_parents.contains(&key) {
            return Err(not_found());
        }

        let all = state.children.get(&key).cloned().unwrap_or_default();
        let start = cursor.map(|c| c.as_str().parse::<usize>().unwrap()).unwrap_or(0);
        let end = (start + page_size as usize).min(all.len());
        let results = all[start..end].to_vec();

        Ok(if end < all.len() {
            PaginatedResponse::with_more(results, Cursor::new(end.to_string()))
        } else {
            PaginatedResponse::last(results)
        })
    }

    async fn update_document(
        &self,
        id: &PageId,
        patch: &DocumentPatch,
    ) -> Result<Document, AppError> {
        let mut state = self.state.lock().unwrap();
        state.updates.push((id.clone(), patch.clone()));

        let rejected = state.reject_all_updates
            || state
                .rejected_property
                .as_deref()
                .is_some_and(|property| patch.get(property).is_some());
        if rejected {
            return Err(AppError::notion(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Property update rejected",
            ));
        }

        let document = state
            .documents
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(not_found)?;

        for (_, update) in patch.iter() {
            match update {
                PropertyUpdate::Checkbox(checked) => document.processed = *checked,
                PropertyUpdate::RichText(text) => document.summary = text.clone(),
                PropertyUpdate::MultiSelect(tags) => document.tags = tags.clone(),
            }
        }
        Ok(document.clone())
    }

    async fn get_schema(&self) -> Result<DatabaseSchema, AppError> {
        let state = self.state.lock().unwrap();
        if state.failing_schema {
            return Err(not_found());
        }
        Ok(DatabaseSchema {
            tag_options: state.tag_options.clone(),
        })
    }
}

/// A text generator with canned replies and call counters.
pub struct FakeGenerator {
    summary: String,
    tags: Vec<String>,
    failure: Option<u16>,
    summarize_calls: AtomicUsize,
    tag_calls: AtomicUsize,
    seen_existing: Mutex<Vec<Vec<String>>>,
}

impl FakeGenerator {
    pub fn new(summary: &str, tags: &[&str]) -> Self {
        Self {
            summary: summary.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            failure: None,
            summarize_calls: AtomicUsize::new(0),
            tag_calls: AtomicUsize::new(0),
            seen_existing: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::new("", &[])
        }
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    pub fn tag_calls(&self) -> usize {
        self.tag_calls.load(Ordering::SeqCst)
    }

    /// The `existing_tags` argument of every tag call, in order.
    pub fn seen_existing(&self) -> Vec<Vec<String>> {
        self.seen_existing.lock().unwrap().clone()
    }

    fn fail(&self) -> Result<(), GenerationError> {
        match self.failure {
            Some(status) => Err(GenerationError::Service {
                status,
                message: "unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for FakeGenerator {
    async fn summarize(
        &self,
        _text: &str,
        _language: &str,
        _max_input_length: usize,
    ) -> Result<String, GenerationError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        self.fail()?;
        Ok(self.summary.clone())
    }

    async fn generate_tags(
        &self,
        _text: &str,
        _max_tags: usize,
        _language: &str,
        _max_input_length: usize,
        existing_tags: &[String],
    ) -> Result<Vec<String>, GenerationError> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_existing
            .lock()
            .unwrap()
            .push(existing_tags.to_vec());
        self.fail()?;
        Ok(self.tags.clone())
    }
}
