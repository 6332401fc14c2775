// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Command-line options override the ones marked as
//! defaults; the rest are fixed by the remote services.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// The Notion API version this client speaks.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Base URL of the Notion REST API.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// How many objects the Notion API returns per page of results at most.
///
/// Requests asking for more are clamped to this value.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Maximum characters in a single rich-text content object.
///
/// Longer summaries are rejected with a validation error, so they are
/// truncated before write-back.
pub const NOTION_RICH_TEXT_LIMIT: usize = 2000;

/// Cap on block nesting during recursive retrieval.
///
/// Notion's block tree is acyclic, but nothing stops it from being
/// pathologically deep. Blocks at this depth keep their children unfetched.
pub const NOTION_MAX_FETCH_DEPTH: usize = 64;

/// Request timeout for a single Notion call.
pub const NOTION_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Retry boundaries
// ---------------------------------------------------------------------------

/// Attempts per Notion call before the failure becomes permanent.
pub const STORE_RETRY_ATTEMPTS: u32 = 5;
pub const STORE_RETRY_BASE_DELAY: Duration = Duration::from_secs(2);
pub const STORE_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Attempts per generation call before the failure becomes permanent.
pub const GENERATION_RETRY_ATTEMPTS: u32 = 3;
pub const GENERATION_RETRY_BASE_DELAY: Duration = Duration::from_secs(2);
pub const GENERATION_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Generation defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LANGUAGE: &str = "zh-CN";
pub const DEFAULT_PERSONAL_DESCRIPTION: &str = "Someone interested in AI.";

/// Characters of flattened text submitted to generation at most.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8192;

/// Tags written back per document at most.
pub const DEFAULT_MAX_TAGS: usize = 5;

/// A summary is one sentence; the token budget keeps it that way.
pub const SUMMARY_TEMPERATURE: f32 = 0.2;
pub const SUMMARY_MAX_TOKENS: u32 = 200;

pub const TAGS_TEMPERATURE: f32 = 0.5;
pub const TAGS_MAX_TOKENS: u32 = 50;

/// Request timeout for a single completion call.
pub const GENERATION_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Seconds between two passes over the unprocessed documents.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Database schema defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PROCESSED_PROPERTY: &str = "Processed";
pub const DEFAULT_SUMMARY_PROPERTY: &str = "Summary";
pub const DEFAULT_TAGS_PROPERTY: &str = "Tags";
pub const DEFAULT_CREATED_PROPERTY: &str = "Created";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
