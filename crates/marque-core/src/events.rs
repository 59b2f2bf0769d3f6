//! The enrichment event model.
//!
//! Events are the only state marque owns: an append-only record that a
//! specific enrichment action completed for a specific bookmark. Every task
//! checks the log before acting, which is what makes the pipeline idempotent
//! without any local copy of bookmark data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Bookmark;

/// The closed set of enrichment actions the pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A previously unseen bookmark was detected by the sync sweep.
    BookmarkCreated,
    /// New tags were merged into the bookmark.
    Tagged,
    /// Readable content was extracted and attached.
    ReadabilityExtracted,
    /// A saved search was resolved to its first result.
    Searched,
    /// A summary was written into the bookmark description.
    Summarized,
}

impl EventAction {
    /// Stable string form used in the database and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::BookmarkCreated => "bookmark_created",
            EventAction::Tagged => "tagged",
            EventAction::ReadabilityExtracted => "readability_extracted",
            EventAction::Searched => "searched",
            EventAction::Summarized => "summarized",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bookmark_created" => Some(EventAction::BookmarkCreated),
            "tagged" => Some(EventAction::Tagged),
            "readability_extracted" => Some(EventAction::ReadabilityExtracted),
            "searched" => Some(EventAction::Searched),
            "summarized" => Some(EventAction::Summarized),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action-specific event payload.
///
/// One strongly typed variant per action, serialized into the event's jsonb
/// `extra` column. Keeping the shapes here (rather than an untyped blob)
/// means a payload can never be appended under the wrong action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventExtra {
    /// Snapshot of the bookmark at sweep time (`bookmark_created`).
    BookmarkSnapshot(Box<Bookmark>),
    /// The tags newly merged by autotag (`tagged`).
    Tags { tags: Vec<String> },
    /// What was extracted and how much (`readability_extracted`).
    Extraction { url: String, content_length: usize },
    /// The resolved query and the pre-resolution URL (`searched`).
    Search { query: String, original_url: String },
    /// Summary provenance (`summarized`).
    Summary {
        url: String,
        original_description: String,
        summary_length: usize,
    },
}

impl EventExtra {
    /// The action this payload belongs to.
    pub fn action(&self) -> EventAction {
        match self {
            EventExtra::BookmarkSnapshot(_) => EventAction::BookmarkCreated,
            EventExtra::Tags { .. } => EventAction::Tagged,
            EventExtra::Extraction { .. } => EventAction::ReadabilityExtracted,
            EventExtra::Search { .. } => EventAction::Searched,
            EventExtra::Summary { .. } => EventAction::Summarized,
        }
    }
}

/// A recorded enrichment event.
///
/// `bookmark_id` is a non-owning reference: the bookmark may be deleted
/// upstream without this record going away. Events are never updated or
/// deleted by marque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub bookmark_id: i64,
    pub action: EventAction,
    /// Timestamp semantically meaningful to the action, e.g. the bookmark's
    /// own creation time for `bookmark_created`.
    pub occurred_at: DateTime<Utc>,
    pub extra: Option<EventExtra>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
