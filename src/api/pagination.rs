// src/api/pagination.rs
//! Cursor-driven merge of a paginated listing into one ordered sequence.

use super::types::{Cursor, PaginatedResponse};
use crate::error::AppError;
use std::future::Future;

/// Fetches every page of a listing, in page order.
///
/// `fetch_page` receives the cursor returned by the previous page (`None`
/// for the first request). Results are appended as-is: no reordering, no
/// dedup. The first failing page aborts the whole listing.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_page(cursor.take()).await?;
        pages_fetched += 1;

        let next = response.continuation().cloned();
        all_items.extend(response.results);

        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    log::debug!(
        "Merged {} items from {} page(s)",
        all_items.len(),
        pages_fetched
    );
    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_are_concatenated_in_order() {
        let pages = vec![
            PaginatedResponse::with_more(vec![1, 2], Cursor::new("a")),
            PaginatedResponse::with_more(vec![3], Cursor::new("b")),
            PaginatedResponse::last(vec![4, 5]),
        ];
        let mut seen_cursors = Vec::new();
        let mut remaining = pages.into_iter();

        let merged = fetch_all_pages(|cursor| {
            seen_cursors.push(cursor.map(|c| c.as_str().to_string()));
            let page = remaining.next();
            async move { page.ok_or_else(|| AppError::MalformedResponse("extra page".into())) }
        })
        .await
        .unwrap();

        assert_eq!(merged, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            seen_cursors,
            vec![None, Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn a_failing_page_aborts_the_listing() {
        let mut calls = 0;
        let result: Result<Vec<u8>, _> = fetch_all_pages(|_| {
            calls += 1;
            let first = calls == 1;
            async move {
                if first {
                    Ok(PaginatedResponse::with_more(vec![1], Cursor::new("x")))
                } else {
                    Err(AppError::rate_limited())
                }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
