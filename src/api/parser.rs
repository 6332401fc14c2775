// src/api/parser.rs
//! Response parsing: success bodies into domain values, error bodies into
//! the typed error vocabulary.

use super::client::ApiResponse;
use super::notion_client_adapter::{convert_block, convert_document, convert_schema};
use super::responses::{
    BlockChildrenResponse, DatabaseEnvelope, NotionError, PageEnvelope, QueryDatabaseResponse,
};
use super::types::{DatabaseSchema, PaginatedResponse};
use crate::config::PropertyNames;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use crate::model::{Block, Document};
use reqwest::StatusCode;

/// Parse any Notion API response: the body on success, the error otherwise.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

/// Notion's error object when present, the HTTP status otherwise.
fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        return AppError::NotionService {
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            status,
        };
    }

    AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}: {}", status, url, preview(body)),
        status,
    }
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// One page of query results, converted to documents.
pub fn parse_documents(
    result: ApiResponse<String>,
    names: &PropertyNames,
) -> Result<Vec<Document>, AppError> {
    let response: QueryDatabaseResponse = parse_api_response(result)?;
    response
        .results
        .into_iter()
        .filter(|page| {
            if page.archived {
                log::debug!("Ignoring archived page {}", page.id);
            }
            !page.archived
        })
        .map(|page| convert_document(page, names))
        .collect()
}

/// A single page object, as returned by an update.
pub fn parse_document(
    result: ApiResponse<String>,
    names: &PropertyNames,
) -> Result<Document, AppError> {
    let page: PageEnvelope = parse_api_response(result)?;
    convert_document(page, names)
}

/// One page of a block's children.
pub fn parse_block_children(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let response: BlockChildrenResponse = parse_api_response(result)?;
    let raw_count = response.results.len();

    let page = PaginatedResponse {
        object: response.object,
        results: response.results.into_iter().filter_map(convert_block).collect(),
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    };

    if page.results.len() < raw_count {
        log::warn!(
            "Dropped {} unreadable block(s) from a page of {}",
            raw_count - page.results.len(),
            raw_count
        );
    }
    Ok(page)
}

/// The tag vocabulary of the database schema.
pub fn parse_schema(
    result: ApiResponse<String>,
    tag_property: &str,
) -> Result<DatabaseSchema, AppError> {
    let database: DatabaseEnvelope = parse_api_response(result)?;
    Ok(convert_schema(database, tag_property))
}
