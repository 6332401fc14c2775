use crate::types::PageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A database entry under curation.
///
/// Created externally; only the processed flag, summary and tags are
/// ever written back by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: PageId,
    pub processed: bool,
    pub summary: String,
    pub tags: Vec<String>,
    pub created: Option<DateTime<Utc>>,
}

impl Document {
    /// An unprocessed document with no summary or tags.
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            processed: false,
            summary: String::new(),
            tags: Vec::new(),
            created: None,
        }
    }
}
