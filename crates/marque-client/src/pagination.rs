//! Lazy walking of cursor-paginated listings.
//!
//! The bookmark service links pages with opaque `next` URLs. [`PageWalker`]
//! follows those cursors exactly as the server hands them out, buffering one
//! page at a time, so walking an unbounded listing stays O(page size) in
//! memory.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use tracing::trace;

use marque_core::Result;

use crate::client::{LinkdingClient, ListParams, Page};

/// Forward-only iterator over every item of a paginated listing.
///
/// Not restartable: the first [`try_next`](Self::try_next) fetches the
/// initial page, and once the final page is drained the walker stays
/// exhausted. The server-reported total is available after any fetch via
/// [`total_count`](Self::total_count) — it is a point-in-time figure, not a
/// promise of how many items will be yielded, since the remote collection
/// can mutate mid-walk.
pub struct PageWalker<'a, T> {
    client: &'a LinkdingClient,
    path: String,
    params: ListParams,
    buffered: VecDeque<T>,
    next: Option<String>,
    count: Option<i64>,
    started: bool,
    finished: bool,
    fetches: usize,
}

impl<'a, T: DeserializeOwned> PageWalker<'a, T> {
    /// Create a walker over `path` with the given initial parameters.
    ///
    /// Nothing is fetched until the first call to [`try_next`](Self::try_next).
    pub fn new(client: &'a LinkdingClient, path: impl Into<String>, params: ListParams) -> Self {
        Self {
            client,
            path: path.into(),
            params,
            buffered: VecDeque::new(),
            next: None,
            count: None,
            started: false,
            finished: false,
            fetches: 0,
        }
    }

    /// Server-reported total across all pages, once any page has been fetched.
    pub fn total_count(&self) -> Option<i64> {
        self.count
    }

    /// Number of page fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Yield the next item, fetching pages as needed.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }
            if self.finished {
                return Ok(None);
            }

            let page: Page<T> = if !self.started {
                self.started = true;
                self.client.get_page(&self.path, &self.params).await?
            } else {
                match self.next.take() {
                    // The cursor is followed verbatim, never re-derived from
                    // the initial parameters.
                    Some(cursor) => self.client.get_page_url(&cursor).await?,
                    None => {
                        self.finished = true;
                        return Ok(None);
                    }
                }
            };

            self.fetches += 1;
            self.count = Some(page.count);
            self.next = page.next;
            if self.next.is_none() {
                self.finished = true;
            }
            trace!(
                subsystem = "client",
                component = "pagination",
                result_count = page.results.len(),
                has_next = !self.finished,
                "Fetched listing page"
            );
            self.buffered = page.results.into();
        }
    }

    /// Drain the walker into a vector.
    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
