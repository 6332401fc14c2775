// src/api/notion_client_adapter.rs
//! Adapter layer for converting notion-client types to our domain model.
//!
//! Content anomalies stop here. A block of an unknown type becomes
//! `BlockKind::Unsupported`; a supported block whose payload notion-client
//! cannot parse keeps its kind with empty content; a property that fails
//! to parse reads as its default. Each case is logged, none is an error.

use super::responses::{
    DatabaseEnvelope, NotionBlock, NotionDatabaseProperty, NotionPageProperty, PageEnvelope,
};
use super::types::DatabaseSchema;
use crate::config::PropertyNames;
use crate::error::AppError;
use crate::model::{Block, BlockContent, BlockKind, Document};
use crate::types::{Annotations, BlockId, PageId, TextRun};
use serde_json::Value;

/// Convert a raw block object into a domain block.
///
/// Returns `None` only when the block has no usable id.
pub fn convert_block(raw: Value) -> Option<Block> {
    let type_name = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let id = match raw.get("id").and_then(Value::as_str).map(BlockId::parse) {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            log::warn!("Skipping {} block with invalid id: {}", type_name, e);
            return None;
        }
        None => {
            log::warn!("Skipping {} block without an id", type_name);
            return None;
        }
    };

    let has_children = raw
        .get("has_children")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let kind = BlockKind::from_type_name(&type_name);
    let block = if kind.is_supported() {
        let content = match serde_json::from_value::<NotionBlock>(raw) {
            Ok(notion_block) => convert_block_content(notion_block),
            Err(e) => {
                log::warn!(
                    "Block {} ({}) has a payload that could not be parsed: {}",
                    id,
                    type_name,
                    e
                );
                BlockContent::Empty
            }
        };
        Block::new(id, kind, content)
    } else {
        log::debug!("Block {} has unsupported type '{}'", id, type_name);
        Block::unsupported(id, type_name)
    };

    Some(if has_children {
        block.with_pending_children()
    } else {
        block
    })
}

/// Extract the type-specific payload of a supported block.
fn convert_block_content(notion_block: NotionBlock) -> BlockContent {
    use notion_client::objects::block::BlockType;

    match notion_block.block_type {
        BlockType::Paragraph { paragraph } => BlockContent::RichText(convert_runs(paragraph.rich_text)),
        BlockType::Heading1 { heading_1 } => BlockContent::RichText(convert_runs(heading_1.rich_text)),
        BlockType::Heading2 { heading_2 } => BlockContent::RichText(convert_runs(heading_2.rich_text)),
        BlockType::Heading3 { heading_3 } => BlockContent::RichText(convert_runs(heading_3.rich_text)),
        BlockType::BulletedListItem { bulleted_list_item } => {
            BlockContent::RichText(convert_runs(bulleted_list_item.rich_text))
        }
        BlockType::NumberedListItem { numbered_list_item } => {
            BlockContent::RichText(convert_runs(numbered_list_item.rich_text))
        }
        BlockType::Quote { quote } => BlockContent::RichText(convert_runs(quote.rich_text)),
        BlockType::Callout { callout } => BlockContent::RichText(convert_runs(callout.rich_text)),
        BlockType::Toggle { toggle } => BlockContent::RichText(convert_runs(toggle.rich_text)),
        BlockType::Code { code } => BlockContent::Code {
            language: code_language(&code.language),
            segments: convert_runs(code.rich_text)
                .into_iter()
                .map(|run| run.text)
                .collect(),
        },
        _ => BlockContent::Empty,
    }
}

/// The wire name of a code language ("python", "plain text", ...).
fn code_language<L: serde::Serialize>(language: &L) -> String {
    match serde_json::to_value(language) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

/// Convert rich text items into runs, dropping those without text.
fn convert_runs(rich_texts: Vec<notion_client::objects::rich_text::RichText>) -> Vec<TextRun> {
    use notion_client::objects::rich_text::RichText as NcRichText;

    rich_texts
        .into_iter()
        .filter_map(|rich_text| match rich_text {
            NcRichText::Text {
                text,
                annotations,
                plain_text,
                ..
            } => Some(TextRun::new(
                plain_text.unwrap_or(text.content),
                convert_annotations(annotations.unwrap_or_default()),
            )),
            NcRichText::Mention {
                annotations,
                plain_text,
                ..
            }
            | NcRichText::Equation {
                annotations,
                plain_text,
                ..
            } => Some(TextRun::new(plain_text, convert_annotations(annotations))),
            _ => None,
        })
        .filter(|run| !run.is_empty())
        .collect()
}

fn convert_annotations(annotations: notion_client::objects::rich_text::Annotations) -> Annotations {
    Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
    }
}

/// Convert a page envelope into a document, reading properties by name.
pub fn convert_document(page: PageEnvelope, names: &PropertyNames) -> Result<Document, AppError> {
    let id = PageId::parse(&page.id)?;
    let mut document = Document::new(id);

    if let Some(NotionPageProperty::Checkbox { checkbox, .. }) =
        page_property(&page, &names.processed)
    {
        document.processed = checkbox;
    }

    if let Some(NotionPageProperty::RichText { rich_text, .. }) =
        page_property(&page, &names.summary)
    {
        document.summary = convert_runs(rich_text)
            .into_iter()
            .map(|run| run.text)
            .collect();
    }

    if let Some(NotionPageProperty::MultiSelect { multi_select, .. }) =
        page_property(&page, &names.tags)
    {
        document.tags = multi_select
            .into_iter()
            .filter_map(|option| option.name)
            .collect();
    }

    document.created = match page_property(&page, &names.created) {
        Some(NotionPageProperty::CreatedTime { created_time, .. }) => Some(created_time),
        _ => page.created_time,
    };

    Ok(document)
}

/// Parse one named page property with notion-client, if present and well-formed.
fn page_property(page: &PageEnvelope, name: &str) -> Option<NotionPageProperty> {
    let raw = page.properties.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(property) => Some(property),
        Err(e) => {
            log::warn!(
                "Property '{}' of page {} could not be parsed: {}",
                name,
                page.id,
                e
            );
            None
        }
    }
}

/// Read the option names of the tag multi-select property.
pub fn convert_schema(database: DatabaseEnvelope, tag_property: &str) -> DatabaseSchema {
    let Some(raw) = database.properties.get(tag_property) else {
        log::warn!(
            "Database {} has no '{}' property; starting with an empty tag vocabulary",
            database.id.as_deref().unwrap_or("?"),
            tag_property
        );
        return DatabaseSchema::default();
    };

    let tag_options = match serde_json::from_value::<NotionDatabaseProperty>(raw.clone()) {
        Ok(NotionDatabaseProperty::MultiSelect { multi_select, .. }) => multi_select
            .options
            .into_iter()
            .map(|option| option.name)
            .collect(),
        Ok(_) => {
            log::warn!(
                "Property '{}' is not a multi-select; starting with an empty tag vocabulary",
                tag_property
            );
            Vec::new()
        }
        Err(e) => {
            log::debug!(
                "notion-client could not parse '{}' ({}), reading option names directly",
                tag_property,
                e
            );
            raw_option_names(raw)
        }
    };

    DatabaseSchema { tag_options }
}

/// Graceful fallback: option names straight from the JSON.
fn raw_option_names(raw: &Value) -> Vec<String> {
    raw.get("multi_select")
        .and_then(|multi_select| multi_select.get("options"))
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| option.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_json(block_type: &str, payload: Value, has_children: bool) -> Value {
        let mut block = json!({
            "object": "block",
            "id": "c02fc1d3-db8b-45c5-a222-27595b15aea7",
            "parent": {"type": "page_id", "page_id": "59833787-2cf9-4fdf-8782-e53db20768a5"},
            "created_time": "2022-03-01T19:05:00.000Z",
            "last_edited_time": "2022-03-01T19:05:00.000Z",
            "created_by": {"object": "user", "id": "ee5f0f84-409a-440f-983a-a5315961c6e4"},
            "last_edited_by": {"object": "user", "id": "ee5f0f84-409a-440f-983a-a5315961c6e4"},
            "has_children": has_children,
            "archived": false,
            "type": block_type
        });
        block[block_type] = payload;
        block
    }

    fn text_item(content: &str, bold: bool, italic: bool) -> Value {
        json!({
            "type": "text",
            "text": {"content": content, "link": null},
            "annotations": {
                "bold": bold, "italic": italic, "strikethrough": false,
                "underline": false, "code": false, "color": "default"
            },
            "plain_text": content,
            "href": null
        })
    }

    #[test]
    fn paragraph_runs_keep_their_annotations() {
        let raw = block_json(
            "paragraph",
            json!({
                "rich_text": [text_item("Hello ", false, false), text_item("world", true, true)],
                "color": "default"
            }),
            false,
        );

        let block = convert_block(raw).unwrap();
        assert_eq!(block.kind, BlockKind::Paragraph);
        match block.content {
            BlockContent::RichText(runs) => {
                assert_eq!(runs.len(), 2);
                assert_eq!(runs[1].text, "world");
                assert!(runs[1].annotations.bold && runs[1].annotations.italic);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn unknown_types_become_unsupported_and_keep_child_flag() {
        let raw = block_json("to_do", json!({"rich_text": [], "checked": false}), true);
        let block = convert_block(raw).unwrap();

        assert_eq!(block.kind, BlockKind::Unsupported("to_do".into()));
        assert!(block.has_children);
        assert_eq!(block.content, BlockContent::Empty);
    }

    #[test]
    fn blocks_without_ids_are_skipped() {
        assert!(convert_block(json!({"type": "paragraph"})).is_none());
    }

    #[test]
    fn schema_reads_tag_options_and_tolerates_absence() {
        let database = DatabaseEnvelope {
            id: Some("db".into()),
            properties: [(
                "Tags".to_string(),
                json!({
                    "id": "tags",
                    "name": "Tags",
                    "type": "multi_select",
                    "multi_select": {"options": [
                        {"id": "1", "name": "rust", "color": "red"},
                        {"id": "2", "name": "ai", "color": "blue"}
                    ]}
                }),
            )]
            .into_iter()
            .collect(),
        };

        assert_eq!(
            convert_schema(database.clone(), "Tags").tag_options,
            vec!["rust".to_string(), "ai".to_string()]
        );
        assert!(convert_schema(database, "Labels").tag_options.is_empty());
    }

    #[test]
    fn missing_properties_read_as_defaults() {
        let page = PageEnvelope {
            id: "59833787-2cf9-4fdf-8782-e53db20768a5".into(),
            created_time: None,
            archived: false,
            properties: Default::default(),
        };

        let document = convert_document(page, &PropertyNames::default()).unwrap();
        assert!(!document.processed);
        assert!(document.summary.is_empty());
        assert!(document.tags.is_empty());
        assert!(document.created.is_none());
    }
}
