// tests/fetching.rs
//! Recursive, paginated block retrieval against an in-memory store.

mod common;

use common::{block_id, fast_retry, page_id, FakeStore};
use notion_curator::{AppError, Block, BlockFetcher, Children, NotionId, TextRun};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn paragraphs(range: std::ops::Range<u32>) -> Vec<Block> {
    range
        .map(|n| Block::paragraph(block_id(n), vec![TextRun::plain(format!("line {}", n))]))
        .collect()
}

fn ids(blocks: &[Block]) -> Vec<String> {
    blocks.iter().map(|b| b.id.to_string()).collect()
}

#[tokio::test]
async fn pages_are_merged_in_order_regardless_of_page_size() {
    let page = page_id(1);
    let children = paragraphs(0..7);
    let expected = ids(&children);

    for page_size in [1, 2, 3, 7, 100] {
        let store = Arc::new(FakeStore::new().with_children(&page, children.clone()));
        let fetcher = BlockFetcher::new(store.clone(), fast_retry(3)).with_page_size(page_size);

        let fetched = fetcher
            .fetch_children(&NotionId::from(&page), false)
            .await
            .unwrap();

        assert_eq!(ids(&fetched), expected, "page size {}", page_size);
        let requests = (7 + page_size as usize - 1) / page_size as usize;
        assert_eq!(store.children_requests_for(&page), requests);
    }
}

#[tokio::test]
async fn empty_collection_yields_no_blocks() {
    let page = page_id(1);
    let store = Arc::new(FakeStore::new());
    let fetcher = BlockFetcher::new(store, fast_retry(3));

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), true)
        .await
        .unwrap();
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn nested_children_are_attached_to_their_parent() {
    let page = page_id(1);
    let toggle = Block::paragraph(block_id(1), vec![TextRun::plain("outer")]).with_pending_children();
    let inner = Block::paragraph(block_id(2), vec![TextRun::plain("inner")]).with_pending_children();
    let leaf = Block::paragraph(block_id(3), vec![TextRun::plain("leaf")]);

    let store = Arc::new(
        FakeStore::new()
            .with_children(&page, vec![toggle])
            .with_children(&block_id(1), vec![inner])
            .with_children(&block_id(2), vec![leaf]),
    );
    let fetcher = BlockFetcher::new(store, fast_retry(3));

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), true)
        .await
        .unwrap();

    assert_eq!(fetched.len(), 1);
    let inner = &fetched[0].child_blocks()[0];
    assert_eq!(inner.id, block_id(2));
    assert_eq!(inner.child_blocks()[0].id, block_id(3));
}

#[tokio::test]
async fn non_recursive_fetch_leaves_children_pending() {
    let page = page_id(1);
    let parent = Block::paragraph(block_id(1), vec![TextRun::plain("p")]).with_pending_children();
    let store = Arc::new(
        FakeStore::new()
            .with_children(&page, vec![parent])
            .with_children(&block_id(1), paragraphs(10..12)),
    );
    let fetcher = BlockFetcher::new(store.clone(), fast_retry(3));

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), false)
        .await
        .unwrap();

    assert_eq!(fetched[0].children, Children::Pending);
    assert_eq!(store.children_requests_for(&block_id(1)), 0);
}

#[tokio::test]
async fn a_failing_child_does_not_abort_its_siblings() {
    let page = page_id(1);
    let broken = Block::paragraph(block_id(1), vec![TextRun::plain("broken")]).with_pending_children();
    let healthy = Block::paragraph(block_id(2), vec![TextRun::plain("healthy")]).with_pending_children();

    let store = Arc::new(
        FakeStore::new()
            .with_children(&page, vec![broken, healthy])
            .with_failing_parent(&block_id(1))
            .with_children(&block_id(2), paragraphs(20..22)),
    );
    let fetcher = BlockFetcher::new(store, fast_retry(3));

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), true)
        .await
        .unwrap();

    assert!(fetched[0].expansion_failed());
    assert!(fetched[0].child_blocks().is_empty());
    assert_eq!(ids(fetched[1].child_blocks()), ids(&paragraphs(20..22)));
}

#[tokio::test]
async fn a_failing_top_level_fetch_is_returned() {
    let page = page_id(1);
    let store = Arc::new(FakeStore::new().with_failing_parent(&page));
    let fetcher = BlockFetcher::new(store.clone(), fast_retry(3));

    let err = fetcher
        .fetch_children(&NotionId::from(&page), true)
        .await
        .unwrap_err();

    assert!(!err.is_transient());
    // Permanent failures are not retried.
    assert_eq!(store.children_requests_for(&page), 1);
}

#[tokio::test]
async fn rate_limits_are_retried_transparently() {
    let page = page_id(1);
    let store = Arc::new(
        FakeStore::new()
            .with_children(&page, paragraphs(0..3))
            .with_rate_limit(&page, 2),
    );
    let fetcher = BlockFetcher::new(store.clone(), fast_retry(5));

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), false)
        .await
        .unwrap();

    assert_eq!(fetched.len(), 3);
    assert_eq!(store.children_requests_for(&page), 3);
}

#[tokio::test]
async fn persistent_rate_limits_exhaust_the_policy() {
    let page = page_id(1);
    let store = Arc::new(
        FakeStore::new()
            .with_children(&page, paragraphs(0..3))
            .with_rate_limit(&page, 100),
    );
    let fetcher = BlockFetcher::new(store.clone(), fast_retry(4));

    let err = fetcher
        .fetch_children(&NotionId::from(&page), false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RetriesExhausted { attempts: 4, .. }));
    assert_eq!(store.children_requests_for(&page), 4);
}

#[tokio::test]
async fn nesting_beyond_the_cap_stays_unfetched() {
    let page = page_id(1);
    let mut store = FakeStore::new().with_children(
        &page,
        vec![Block::paragraph(block_id(0), vec![TextRun::plain("0")]).with_pending_children()],
    );
    for n in 0..5 {
        store = store.with_children(
            &block_id(n),
            vec![Block::paragraph(block_id(n + 1), vec![TextRun::plain(n.to_string())])
                .with_pending_children()],
        );
    }
    let store = Arc::new(store);
    let fetcher = BlockFetcher::new(store.clone(), fast_retry(3)).with_max_depth(3);

    let fetched = fetcher
        .fetch_children(&NotionId::from(&page), true)
        .await
        .unwrap();

    // Depth 1 and 2 are expanded, the block at depth 3 is not.
    let level2 = &fetched[0].child_blocks()[0];
    let level3 = &level2.child_blocks()[0];
    assert_eq!(level3.id, block_id(2));
    assert_eq!(level3.children, Children::Pending);
    assert_eq!(store.children_requests_for(&block_id(2)), 0);
}
