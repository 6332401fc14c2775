// src/api/mod.rs
//! Document store interaction.
//!
//! Business logic depends on the [`DocumentStore`] trait, never on HTTP
//! details. `client` implements it for the Notion REST API; `fetcher`
//! builds recursive, paginated retrieval on top of it.

pub mod client;
pub mod fetcher;
pub mod notion_client_adapter;
pub mod pagination;
pub mod parser;
mod responses;
pub mod types;

use crate::error::AppError;
use crate::model::{Block, Document};
use crate::types::{NotionId, PageId};
use types::{Cursor, DatabaseSchema, DocumentPatch, DocumentQuery, PaginatedResponse};

/// The minimal set of store operations the curator needs.
///
/// Implementations report failures as-is; retrying is the caller's job.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// First page of documents matching the query, in the query's sort order.
    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError>;

    /// One page of a node's children.
    async fn get_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<&Cursor>,
    ) -> Result<PaginatedResponse<Block>, AppError>;

    /// Partial update: only the named properties change.
    async fn update_document(
        &self,
        id: &PageId,
        patch: &DocumentPatch,
    ) -> Result<Document, AppError>;

    /// The database schema, read for the tag option set.
    async fn get_schema(&self) -> Result<DatabaseSchema, AppError>;
}

// Re-export the public interface
pub use client::NotionHttpClient;
pub use fetcher::BlockFetcher;
