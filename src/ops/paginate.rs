//! Pagination collector

use anyhow::Result;
use std::future::Future;

/// One page of a cursor-based listing
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> PaginatedResult<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Fetch every page (auto-paginate)
///
/// `fetch_page` receives the cursor of the previous page (`None` for the first one).
/// Items are kept in arrival order; `on_page` is called with the running total after each page.
pub async fn collect_all<T, F, Fut, P>(mut fetch_page: F, mut on_page: P) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<T>>>,
    P: FnMut(usize),
{
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let result = fetch_page(page_token.take()).await?;
        all_items.extend(result.items);
        on_page(all_items.len());

        // An empty token is treated like a missing one
        match result.next_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(all_items)
}
