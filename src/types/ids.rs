use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Strongly typed Notion identifier, stored in its undashed lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

/// A database entry (a "page" in Notion terms).
pub type PageId = Id<PageMarker>;
/// A node of rich content inside a page.
pub type BlockId = Id<BlockMarker>;
/// The database being curated.
pub type DatabaseId = Id<DatabaseMarker>;

impl<T> Id<T> {
    /// Parses a bare, dashed, or URL-embedded Notion ID.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            value: normalize_notion_id(input)?,
            _phantom: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The dashed UUID form the REST API expects in paths.
    pub fn to_dashed(&self) -> String {
        dashed(&self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// An ID whose object kind is not known statically, e.g. the parent
/// of a child collection (a page or a block).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotionId(String);

impl NotionId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        normalize_notion_id(input).map(NotionId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_dashed(&self) -> String {
        dashed(&self.0)
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> From<&Id<T>> for NotionId {
    fn from(id: &Id<T>) -> Self {
        NotionId(id.value.clone())
    }
}

impl<T> From<Id<T>> for NotionId {
    fn from(id: Id<T>) -> Self {
        NotionId(id.value)
    }
}

fn dashed(value: &str) -> String {
    if value.len() == 32 {
        format!(
            "{}-{}-{}-{}-{}",
            &value[0..8],
            &value[8..12],
            &value[12..16],
            &value[16..20],
            &value[20..32]
        )
    } else {
        value.to_string()
    }
}

/// Normalizes the accepted ID spellings into 32 lowercase hex characters.
fn normalize_notion_id(input: &str) -> Result<String, ValidationError> {
    let cleaned = input.trim().trim_end_matches('/');

    if let Ok(uuid) = Uuid::parse_str(cleaned) {
        return Ok(uuid.as_simple().to_string());
    }

    if cleaned.len() == 32 && cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(cleaned.to_lowercase());
    }

    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        return extract_from_url(cleaned);
    }

    Err(ValidationError::InvalidId(format!(
        "Could not parse Notion ID from: {}",
        input
    )))
}

fn extract_from_url(url: &str) -> Result<String, ValidationError> {
    lazy_static::lazy_static! {
        static ref ID_REGEX: Regex = Regex::new(
            r"(?:[/-])([a-fA-F0-9]{32}|[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})(?:[/?#]|$)"
        ).expect("Notion ID regex is a valid constant pattern");
    }

    ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().replace('-', "").to_lowercase())
        .ok_or_else(|| ValidationError::InvalidId(format!("No valid ID found in URL: {}", url)))
}
