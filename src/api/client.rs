// src/api/client.rs
//! HTTP client for the Notion API.
//!
//! A thin wrapper around reqwest: authentication headers, request helpers,
//! and the [`DocumentStore`](super::DocumentStore) implementation for one
//! database. Parsing lives in `parser`; retries live with the callers.

use super::parser::{parse_block_children, parse_document, parse_documents, parse_schema};
use super::types::{
    clamp_page_size, Cursor, DatabaseSchema, DocumentPatch, DocumentQuery, PaginatedResponse,
};
use crate::config::PropertyNames;
use crate::constants::{NOTION_API_BASE, NOTION_API_VERSION, NOTION_REQUEST_TIMEOUT};
use crate::error::AppError;
use crate::model::{Block, Document};
use crate::types::{ApiKey, DatabaseId, NotionId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;

/// Notion client bound to the curated database.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
    database_id: DatabaseId,
    names: PropertyNames,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(
        api_key: &ApiKey,
        database_id: DatabaseId,
        names: PropertyNames,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .timeout(NOTION_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: NOTION_API_BASE.to_string(),
            database_id,
            names,
        })
    }

    /// Points the client at another API root (a proxy or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Makes a GET request with query parameters to the specified endpoint.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("GET {} {:?}", url, query);
        Ok(self.client.get(url).query(query).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a PATCH request with JSON body to the specified endpoint.
    pub async fn patch<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl super::DocumentStore for NotionHttpClient {
    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        let endpoint = format!("databases/{}/query", self.database_id.to_dashed());
        let response = self.post(&endpoint, query).await?;
        let result = extract_response_text(response).await?;
        parse_documents(result, &self.names)
    }

    async fn get_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<&Cursor>,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_dashed());
        let mut query = vec![("page_size", clamp_page_size(page_size).to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.as_str().to_string()));
        }

        let response = self.get(&endpoint, &query).await?;
        let result = extract_response_text(response).await?;
        parse_block_children(result)
    }

    async fn update_document(
        &self,
        id: &PageId,
        patch: &DocumentPatch,
    ) -> Result<Document, AppError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        let response = self.patch(&endpoint, &patch.to_request_body()).await?;
        let result = extract_response_text(response).await?;
        parse_document(result, &self.names)
    }

    async fn get_schema(&self) -> Result<DatabaseSchema, AppError> {
        let endpoint = format!("databases/{}", self.database_id.to_dashed());
        let response = self.get(&endpoint, &[]).await?;
        let result = extract_response_text(response).await?;
        parse_schema(result, &self.names.tags)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
