// src/api/types.rs
//! Request and response shapes for the document store.
//!
//! These are narrow: a filtered query, one page of a child
//! collection, a partial property update, and the tag option set.

use crate::constants::{NOTION_API_PAGE_SIZE, NOTION_RICH_TEXT_LIMIT};
use crate::types::truncate_chars;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Opaque continuation token. Consumed exactly once per page request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    pub next_cursor: Option<Cursor>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// The last page of a listing.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            object: "list".to_string(),
            results,
            next_cursor: None,
            has_more: false,
        }
    }

    /// A page followed by more, reachable through `cursor`.
    pub fn with_more(results: Vec<T>, cursor: Cursor) -> Self {
        Self {
            object: "list".to_string(),
            results,
            next_cursor: Some(cursor),
            has_more: true,
        }
    }

    /// The cursor for the following page, if the store reported one.
    ///
    /// A page claiming more results without a cursor ends the listing.
    pub fn continuation(&self) -> Option<&Cursor> {
        if self.has_more {
            self.next_cursor.as_ref()
        } else {
            None
        }
    }
}

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A property sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

/// A structured filter plus sort order, answered with a single page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    pub page_size: u32,
}

impl DocumentQuery {
    /// Documents whose checkbox `processed_property` is unchecked, newest first
    /// by `created_property`.
    pub fn unprocessed(processed_property: &str, created_property: &str, page_size: u32) -> Self {
        Self {
            filter: Some(json!({
                "property": processed_property,
                "checkbox": { "equals": false }
            })),
            sorts: vec![Sort {
                property: created_property.to_string(),
                direction: SortDirection::Descending,
            }],
            page_size: clamp_page_size(page_size),
        }
    }

    /// The checkbox property the filter tests, if this is a checkbox filter.
    pub fn checkbox_filter(&self) -> Option<(&str, bool)> {
        let filter = self.filter.as_ref()?;
        let property = filter.get("property")?.as_str()?;
        let equals = filter.get("checkbox")?.get("equals")?.as_bool()?;
        Some((property, equals))
    }
}

/// A new value for one named property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyUpdate {
    Checkbox(bool),
    RichText(String),
    MultiSelect(Vec<String>),
}

impl PropertyUpdate {
    /// The Notion property-value payload for this update.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Checkbox(checked) => json!({ "checkbox": checked }),
            Self::RichText(content) => json!({
                "rich_text": [{ "text": { "content": truncate_chars(content, NOTION_RICH_TEXT_LIMIT) } }]
            }),
            Self::MultiSelect(names) => {
                let options: Vec<Value> = names
                    .iter()
                    .map(|name| json!({ "name": name.replace(',', "") }))
                    .collect();
                json!({ "multi_select": options })
            }
        }
    }
}

/// A partial update: named properties only, everything else untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    properties: IndexMap<String, PropertyUpdate>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: impl Into<String>, update: PropertyUpdate) -> Self {
        self.properties.insert(property.into(), update);
        self
    }

    pub fn get(&self, property: &str) -> Option<&PropertyUpdate> {
        self.properties.get(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyUpdate)> {
        self.properties.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Request body for `PATCH /pages/{id}`.
    pub fn to_request_body(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, update)| (name.clone(), update.to_json()))
            .collect();
        json!({ "properties": properties })
    }
}

/// The slice of the database schema this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSchema {
    /// Option names of the tag multi-select property, in schema order.
    pub tag_options: Vec<String>,
}

/// Clamps a requested page size into `1..=100`.
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, NOTION_API_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unprocessed_query_matches_the_store_filter_syntax() {
        let query = DocumentQuery::unprocessed("Processed", "Created", 500);
        let body = serde_json::to_value(&query).unwrap();

        assert_eq!(
            body,
            json!({
                "filter": { "property": "Processed", "checkbox": { "equals": false } },
                "sorts": [{ "property": "Created", "direction": "descending" }],
                "page_size": 100
            })
        );
        assert_eq!(query.checkbox_filter(), Some(("Processed", false)));
    }

    #[test]
    fn patch_serializes_each_property_kind() {
        let patch = DocumentPatch::new()
            .set("Summary", PropertyUpdate::RichText("One line.".into()))
            .set(
                "Tags",
                PropertyUpdate::MultiSelect(vec!["rust".into(), "a,b".into()]),
            )
            .set("Processed", PropertyUpdate::Checkbox(true));

        assert_eq!(
            patch.to_request_body(),
            json!({
                "properties": {
                    "Summary": { "rich_text": [{ "text": { "content": "One line." } }] },
                    "Tags": { "multi_select": [{ "name": "rust" }, { "name": "ab" }] },
                    "Processed": { "checkbox": true }
                }
            })
        );
    }

    #[test]
    fn long_summaries_are_cut_on_char_boundaries() {
        let summary = "é".repeat(NOTION_RICH_TEXT_LIMIT + 10);
        let body = PropertyUpdate::RichText(summary).to_json();
        let content = body["rich_text"][0]["text"]["content"].as_str().unwrap();
        assert_eq!(content.chars().count(), NOTION_RICH_TEXT_LIMIT);
    }

    #[test]
    fn has_more_without_cursor_ends_the_listing() {
        let mut page = PaginatedResponse::with_more(vec![1], Cursor::new("c1"));
        assert_eq!(page.continuation(), Some(&Cursor::new("c1")));
        page.next_cursor = None;
        assert_eq!(page.continuation(), None);
    }
}
