//! Search: resolve a saved search-results bookmark to its first hit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};
use url::Url;

use marque_client::LinkdingClient;
use marque_core::defaults::FROM_SEARCH_TAG;
use marque_core::{
    BookmarkPayload, EventAction, EventExtra, EventStore, JobRepository, JobType, Result,
    WebSearchBackend,
};

use crate::autotag::merge_tags;
use crate::dispatch::{submit_for_bookmark, SearchFollowUps};
use crate::handler::{JobContext, JobHandler, JobResult};

/// Pull the `q` parameter out of a URL's query string.
///
/// Returns `None` when the URL does not parse, has no query string, or has
/// no non-empty `q` parameter. Percent- and plus-decoding is applied, so
/// `?q=rust+ownership` yields `"rust ownership"`.
pub(crate) fn extract_search_query(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.query()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .filter(|q| !q.is_empty())
}

/// Rewrites a bookmark that points at a search-results page to point at the
/// first-ranked result, then re-submits the enrichment tasks that depend on
/// the bookmark's content.
///
/// Constructed without a backend when no search credential is configured; in
/// that state every invocation is a silent no-op.
pub struct SearchHandler {
    client: Arc<LinkdingClient>,
    events: Arc<dyn EventStore>,
    jobs: Arc<dyn JobRepository>,
    search: Option<Arc<dyn WebSearchBackend>>,
    follow_ups: SearchFollowUps,
}

impl SearchHandler {
    pub fn new(
        client: Arc<LinkdingClient>,
        events: Arc<dyn EventStore>,
        jobs: Arc<dyn JobRepository>,
        search: Option<Arc<dyn WebSearchBackend>>,
    ) -> Self {
        Self {
            client,
            events,
            jobs,
            search,
            follow_ups: SearchFollowUps::default(),
        }
    }

    /// Override which tasks are re-submitted after a resolved search.
    pub fn with_follow_ups(mut self, follow_ups: SearchFollowUps) -> Self {
        self.follow_ups = follow_ups;
        self
    }

    async fn run(&self, bookmark_id: i64) -> Result<Option<JsonValue>> {
        let Some(search) = &self.search else {
            debug!(bookmark_id, "Search provider not configured, skipping");
            return Ok(None);
        };

        let bookmark = self.client.get_bookmark(bookmark_id).await?;
        if bookmark.is_archived {
            debug!(bookmark_id, "Skipping archived bookmark");
            return Ok(None);
        }
        if self
            .events
            .exists(bookmark_id, EventAction::Searched)
            .await?
        {
            debug!(bookmark_id, "Already searched, nothing to do");
            return Ok(None);
        }

        let Some(query) = extract_search_query(&bookmark.url) else {
            debug!(bookmark_id, "Bookmark URL carries no search query");
            return Ok(None);
        };

        info!(
            subsystem = "jobs",
            component = "search",
            bookmark_id,
            query = %query,
            "Resolving saved search"
        );

        // Provider failures and empty result sets are both "nothing to do".
        let hits = match search.search(&query).await {
            Ok(hits) => hits,
            Err(e) if e.is_soft() => {
                info!(bookmark_id, error = %e, "Search failed, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let Some(first) = hits.first() else {
            info!(bookmark_id, "Search returned no results");
            return Ok(None);
        };

        let now = Utc::now();
        let original_url = bookmark.url.clone();

        let mut payload = BookmarkPayload::from(&bookmark);
        payload.url = first.url.clone();
        payload.title = first.title.clone();
        payload.description = first.description.clone();
        payload.notes = format!(
            "{}\n\nLast searched: {}\nOriginal search URL: {}",
            bookmark.notes,
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            original_url
        );
        payload.tag_names = merge_tags(&bookmark.tag_names, &[FROM_SEARCH_TAG.to_string()]);
        self.client.update_bookmark(bookmark_id, &payload).await?;

        self.events
            .append(
                bookmark_id,
                EventAction::Searched,
                now,
                Some(EventExtra::Search {
                    query: query.clone(),
                    original_url: original_url.clone(),
                }),
            )
            .await?;

        // The bookmark's URL and content just changed, so the content-driven
        // tasks must run again against the resolved destination.
        submit_for_bookmark(
            &self.jobs,
            bookmark_id,
            &self.follow_ups.job_types(),
            None,
        )
        .await?;

        info!(
            subsystem = "jobs",
            component = "search",
            bookmark_id,
            resolved_url = %first.url,
            "Resolved saved search"
        );
        Ok(Some(json!({
            "query": query,
            "original_url": original_url,
            "resolved_url": first.url,
        })))
    }
}

#[async_trait]
impl JobHandler for SearchHandler {
    fn job_type(&self) -> JobType {
        JobType::Search
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(bookmark_id) = ctx.bookmark_id() else {
            return JobResult::Failed("search job requires a bookmark id".into());
        };
        match self.run(bookmark_id).await {
            Ok(result) => JobResult::Success(result),
            Err(e) => JobResult::Failed(e.to_string()),
        }
    }
}
