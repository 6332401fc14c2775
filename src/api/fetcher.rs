// src/api/fetcher.rs
//! Recursive, paginated retrieval of a block tree.
//!
//! Children are fetched depth-first, one request at a time, all under the
//! same Notion rate limit.

use super::pagination::fetch_all_pages;
use super::DocumentStore;
use crate::constants::{NOTION_API_PAGE_SIZE, NOTION_MAX_FETCH_DEPTH};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::model::Block;
use crate::types::NotionId;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Fetches a node's child collection across all its pages.
pub struct BlockFetcher {
    store: Arc<dyn DocumentStore>,
    retry: RetryPolicy,
    page_size: u32,
    max_depth: usize,
}

impl BlockFetcher {
    pub fn new(store: Arc<dyn DocumentStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            page_size: NOTION_API_PAGE_SIZE,
            max_depth: NOTION_MAX_FETCH_DEPTH,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = super::types::clamp_page_size(page_size);
        self
    }

    /// Overrides the nesting cap. Blocks at the cap keep their children pending.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Fetches the children of `parent`, in store order.
    ///
    /// With `recursive`, every child that owns children is expanded in turn.
    /// A failure below the top level is contained: the affected block is
    /// marked as failed to expand and its siblings are still fetched. A
    /// failure at the top level is returned.
    pub async fn fetch_children(
        &self,
        parent: &NotionId,
        recursive: bool,
    ) -> Result<Vec<Block>, AppError> {
        let mut blocks = self.fetch_level(parent).await?;
        if recursive {
            self.expand(&mut blocks, 1).await;
        }
        Ok(blocks)
    }

    /// One logical collection; every page request goes through the retry policy.
    async fn fetch_level(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let label = format!("fetch children of {}", parent);
        let blocks = fetch_all_pages(|cursor| {
            let label = label.as_str();
            async move {
                self.retry
                    .run(label, || {
                        self.store
                            .get_children(parent, self.page_size, cursor.as_ref())
                    })
                    .await
            }
        })
        .await?;

        log::debug!("Fetched {} child block(s) of {}", blocks.len(), parent);
        Ok(blocks)
    }

    fn expand<'a>(&'a self, blocks: &'a mut [Block], depth: usize) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            for block in blocks.iter_mut().filter(|block| block.has_children) {
                if depth >= self.max_depth {
                    log::warn!(
                        "Block {} is nested {} levels deep; leaving its children unfetched",
                        block.id,
                        depth
                    );
                    continue;
                }

                let id = NotionId::from(&block.id);
                match self.fetch_level(&id).await {
                    Ok(mut children) => {
                        self.expand(&mut children, depth + 1).await;
                        block.set_children(children);
                    }
                    Err(e) => {
                        log::warn!(
                            "Could not expand children of {} block {}: {}",
                            block.block_type(),
                            block.id,
                            e
                        );
                        block.mark_expansion_failed(e.to_string());
                    }
                }
            }
        })
    }
}
