//! Summarize: condense extracted content into the bookmark description.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use marque_client::{LinkdingClient, ListParams};
use marque_core::defaults::SUMMARY_INPUT_MAX_CHARS;
use marque_core::{
    BookmarkPayload, EventAction, EventExtra, EventStore, GenerationBackend, JobType, Result,
};

use crate::handler::{JobContext, JobHandler, JobResult};

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Downloads the `content.txt` asset left by the readability task and asks
/// the chat collaborator for a short description.
///
/// The only ordering dependency is the asset itself: when it is absent (the
/// readability task has not run, or found nothing) this task is a no-op, not
/// an error.
pub struct SummarizeHandler {
    client: Arc<LinkdingClient>,
    events: Arc<dyn EventStore>,
    chat: Arc<dyn GenerationBackend>,
}

impl SummarizeHandler {
    pub fn new(
        client: Arc<LinkdingClient>,
        events: Arc<dyn EventStore>,
        chat: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            client,
            events,
            chat,
        }
    }

    fn build_prompt(content: &str) -> String {
        format!(
            "You are a content summarizer. Provide a concise summary of the\n\
             following content. The summary should be 2-3 sentences that capture\n\
             the main points and purpose of the content. Focus on what would be\n\
             most useful in a bookmark description.\n\n\
             Content:\n{content}\n\n\
             Return only the summary text with no additional formatting or\n\
             explanation."
        )
    }

    async fn run(&self, bookmark_id: i64) -> Result<Option<JsonValue>> {
        let bookmark = self.client.get_bookmark(bookmark_id).await?;
        if bookmark.is_archived {
            debug!(bookmark_id, "Skipping archived bookmark");
            return Ok(None);
        }
        if self
            .events
            .exists(bookmark_id, EventAction::Summarized)
            .await?
        {
            debug!(bookmark_id, "Already summarized, nothing to do");
            return Ok(None);
        }

        let assets = self
            .client
            .list_bookmark_assets(bookmark_id, &ListParams::default())
            .await?;
        let Some(asset) = assets.results.iter().find(|a| a.is_content_upload()) else {
            info!(bookmark_id, "No content asset available, skipping summary");
            return Ok(None);
        };

        let bytes = self
            .client
            .download_bookmark_asset(bookmark_id, asset.id)
            .await?;
        let content = String::from_utf8_lossy(&bytes);
        let truncated = truncate_chars(&content, SUMMARY_INPUT_MAX_CHARS);

        let response = self.chat.generate(&Self::build_prompt(truncated)).await?;
        let summary = response.trim();
        if summary.is_empty() {
            info!(bookmark_id, "Chat collaborator produced no summary");
            return Ok(None);
        }

        let original_description = bookmark.description.clone();
        let mut payload = BookmarkPayload::from(&bookmark);
        payload.description = summary.to_string();
        self.client.update_bookmark(bookmark_id, &payload).await?;

        let summary_length = summary.chars().count();
        self.events
            .append(
                bookmark_id,
                EventAction::Summarized,
                Utc::now(),
                Some(EventExtra::Summary {
                    url: bookmark.url.clone(),
                    original_description,
                    summary_length,
                }),
            )
            .await?;

        info!(
            subsystem = "jobs",
            component = "summarize",
            bookmark_id,
            response_len = summary_length,
            "Wrote summary into description"
        );
        Ok(Some(json!({ "summary_length": summary_length })))
    }
}

#[async_trait]
impl JobHandler for SummarizeHandler {
    fn job_type(&self) -> JobType {
        JobType::Summarize
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(bookmark_id) = ctx.bookmark_id() else {
            return JobResult::Failed("summarize job requires a bookmark id".into());
        };
        match self.run(bookmark_id).await {
            Ok(result) => JobResult::Success(result),
            Err(e) => JobResult::Failed(e.to_string()),
        }
    }
}
