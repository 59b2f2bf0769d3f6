//! Autotag: propose and merge new tags via the chat collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use marque_client::{LinkdingClient, ListParams, PageWalker};
use marque_core::{
    Bookmark, BookmarkPayload, Error, EventAction, EventExtra, EventStore, GenerationBackend,
    JobType, Result, Tag,
};

use crate::handler::{JobContext, JobHandler, JobResult};

/// Merge `new` into `existing` as an ordered union: existing tags keep their
/// positions, genuinely new tags are appended in proposal order.
pub(crate) fn merge_tags(existing: &[String], new: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for tag in new {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Fetches the bookmark and the service's tag vocabulary, asks the chat
/// collaborator for strictly-JSON tag proposals, and union-merges them into
/// the bookmark.
pub struct AutotagHandler {
    client: Arc<LinkdingClient>,
    events: Arc<dyn EventStore>,
    chat: Arc<dyn GenerationBackend>,
}

impl AutotagHandler {
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

    fn build_prompt(bookmark: &Bookmark, available_tags: &[String]) -> Result<String> {
        let bookmark_json = serde_json::to_string_pretty(bookmark)?;
        let tags_json = serde_json::to_string(available_tags)?;
        Ok(format!(
            "You are a content analyst that tags bookmarks for clustering.\n\
             Tag the bookmark below with appropriate tags. Only add tags that are\n\
             not already present on the bookmark and cannot be approximated by one\n\
             of the available tags.\n\n\
             Bookmark:\n{bookmark_json}\n\n\
             Available tags:\n{tags_json}\n\n\
             Return the tags as a JSON array of strings with no other formatting.\n\
             The response MUST be valid JSON."
        ))
    }

    async fn run(&self, bookmark_id: i64) -> Result<Option<JsonValue>> {
        let bookmark = self.client.get_bookmark(bookmark_id).await?;
        if bookmark.is_archived {
            debug!(bookmark_id, "Skipping archived bookmark");
            return Ok(None);
        }
        if self.events.exists(bookmark_id, EventAction::Tagged).await? {
            debug!(bookmark_id, "Already tagged, nothing to do");
            return Ok(None);
        }

        let tag_walker: PageWalker<Tag> =
            PageWalker::new(&self.client, "api/tags/", ListParams::default());
        let available_tags: Vec<String> = tag_walker
            .try_collect()
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();

        let prompt = Self::build_prompt(&bookmark, &available_tags)?;
        let response = self.chat.generate(&prompt).await?;

        // Strict parse: anything other than a JSON string array is a task
        // failure, propagated to the queue for its retry policy.
        let new_tags: Vec<String> = serde_json::from_str(response.trim()).map_err(|e| {
            Error::Serialization(format!(
                "chat collaborator returned malformed tag JSON: {e}"
            ))
        })?;

        if new_tags.is_empty() {
            info!(bookmark_id, "No new tags proposed");
            return Ok(None);
        }

        let mut payload = BookmarkPayload::from(&bookmark);
        payload.tag_names = merge_tags(&bookmark.tag_names, &new_tags);
        self.client.update_bookmark(bookmark_id, &payload).await?;

        self.events
            .append(
                bookmark_id,
                EventAction::Tagged,
                bookmark.date_added,
                Some(EventExtra::Tags {
                    tags: new_tags.clone(),
                }),
            )
            .await?;

        info!(
            subsystem = "jobs",
            component = "autotag",
            bookmark_id,
            result_count = new_tags.len(),
            "Merged new tags"
        );
        Ok(Some(json!({ "tags": new_tags })))
    }
}

#[async_trait]
impl JobHandler for AutotagHandler {
    fn job_type(&self) -> JobType {
        JobType::Autotag
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(bookmark_id) = ctx.bookmark_id() else {
            return JobResult::Failed("autotag job requires a bookmark id".into());
        };
        match self.run(bookmark_id).await {
            Ok(result) => JobResult::Success(result),
            Err(e) => JobResult::Failed(e.to_string()),
        }
    }
}
