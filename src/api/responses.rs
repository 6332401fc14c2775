// src/api/responses.rs
//! Wire envelopes for Notion API responses.
//!
//! Envelopes are lenient: only the identifying fields are required, and
//! individual properties and blocks stay raw JSON until the adapter parses
//! them one at a time with notion-client's types. A single odd property or
//! block then degrades to a default instead of failing the whole response.

use super::types::PaginatedResponse;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// Re-export notion-client types for the adapter
pub use notion_client::objects::{
    block::Block as NotionBlock, database::DatabaseProperty as NotionDatabaseProperty,
    error::Error as NotionError, page::PageProperty as NotionPageProperty,
};

/// A database entry as returned by query and update calls.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// The database object, read for its property schema.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// Database query response; one page of entries.
pub type QueryDatabaseResponse = PaginatedResponse<PageEnvelope>;

/// Block children response; blocks stay raw until converted.
pub type BlockChildrenResponse = PaginatedResponse<Value>;
