//! Readability: extract the page's primary text into notes and an asset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use url::Url;

use marque_client::LinkdingClient;
use marque_core::defaults::CONTENT_ASSET_NAME;
use marque_core::{
    BookmarkPayload, ContentExtractor, EventAction, EventExtra, EventStore, JobType, Result,
};

use crate::handler::{JobContext, JobHandler, JobResult};

/// True when the URL is well-formed enough to hand to the extractor: it must
/// carry both a scheme and a host.
pub(crate) fn is_extractable_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.has_host(),
        Err(_) => false,
    }
}

/// Extracts readable content from the bookmark's URL, appends it to the
/// bookmark's notes, and stashes it as a `content.txt` asset for the
/// summarize task.
pub struct ReadabilityHandler {
    client: Arc<LinkdingClient>,
    events: Arc<dyn EventStore>,
    extractor: Arc<dyn ContentExtractor>,
}

impl ReadabilityHandler {
    pub fn new(
        client: Arc<LinkdingClient>,
        events: Arc<dyn EventStore>,
        extractor: Arc<dyn ContentExtractor>,
    ) -> Self {
        Self {
            client,
            events,
            extractor,
        }
    }

    async fn run(&self, bookmark_id: i64) -> Result<Option<JsonValue>> {
        let bookmark = self.client.get_bookmark(bookmark_id).await?;
        if bookmark.is_archived {
            debug!(bookmark_id, "Skipping archived bookmark");
            return Ok(None);
        }
        if self
            .events
            .exists(bookmark_id, EventAction::ReadabilityExtracted)
            .await?
        {
            debug!(bookmark_id, "Content already extracted, nothing to do");
            return Ok(None);
        }

        if !is_extractable_url(&bookmark.url) {
            warn!(bookmark_id, url = %bookmark.url, "Bookmark URL is not extractable");
            return Ok(None);
        }

        info!(
            subsystem = "jobs",
            component = "readability",
            bookmark_id,
            url = %bookmark.url,
            "Extracting readable content"
        );

        // Extraction misses are soft: log and leave the bookmark untouched so
        // a later re-submission can try again.
        let content = match self.extractor.extract(&bookmark.url).await {
            Ok(text) => text,
            Err(e) if e.is_soft() => {
                info!(bookmark_id, error = %e, "No readable content extracted");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if content.trim().is_empty() {
            info!(bookmark_id, "No readable content extracted");
            return Ok(None);
        }

        let mut payload = BookmarkPayload::from(&bookmark);
        let separator = if payload.notes.is_empty() {
            ""
        } else {
            "\n\n---\n\n"
        };
        payload.notes = format!("{}{}Content:\n\n{}", payload.notes, separator, content);
        self.client.update_bookmark(bookmark_id, &payload).await?;

        // The notes update already succeeded; a failed asset upload must not
        // fail the whole task.
        if let Err(e) = self
            .client
            .upload_bookmark_asset(bookmark_id, CONTENT_ASSET_NAME, content.clone().into_bytes())
            .await
        {
            warn!(bookmark_id, error = %e, "Failed to upload content asset");
        }

        let content_length = content.chars().count();
        self.events
            .append(
                bookmark_id,
                EventAction::ReadabilityExtracted,
                Utc::now(),
                Some(EventExtra::Extraction {
                    url: bookmark.url.clone(),
                    content_length,
                }),
            )
            .await?;

        info!(
            subsystem = "jobs",
            component = "readability",
            bookmark_id,
            content_len = content_length,
            "Extracted readable content"
        );
        Ok(Some(json!({ "content_length": content_length })))
    }
}

#[async_trait]
impl JobHandler for ReadabilityHandler {
    fn job_type(&self) -> JobType {
        JobType::Readability
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(bookmark_id) = ctx.bookmark_id() else {
            return JobResult::Failed("readability job requires a bookmark id".into());
        };
        match self.run(bookmark_id).await {
            Ok(result) => JobResult::Success(result),
            Err(e) => JobResult::Failed(e.to_string()),
        }
    }
}
