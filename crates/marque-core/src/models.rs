//! Core data models for marque.
//!
//! These types are shared across all marque crates. Bookmark, tag, bundle and
//! asset records mirror the bookmark service's wire format; the service owns
//! them and marque holds no authoritative copy. The job types model the local
//! dispatch queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// BOOKMARK TYPES
// =============================================================================

/// A bookmark as returned by the bookmark service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    /// Title scraped by the service from the page itself (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_title: Option<String>,
    /// Description scraped by the service from the page itself (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_description: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub tag_names: Vec<String>,
    pub date_added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
}

/// Writable bookmark fields, sent on create and full update.
///
/// Updates must always be a full merge of the current bookmark plus the
/// caller's delta; construct this from an existing [`Bookmark`] and mutate
/// the fields that changed. A partial payload would silently clear the
/// service-side value of every omitted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkPayload {
    pub url: String,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub is_archived: bool,
    pub unread: bool,
    pub shared: bool,
    pub tag_names: Vec<String>,
}

impl From<&Bookmark> for BookmarkPayload {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            notes: bookmark.notes.clone(),
            is_archived: bookmark.is_archived,
            unread: bookmark.unread,
            shared: bookmark.shared,
            tag_names: bookmark.tag_names.clone(),
        }
    }
}

/// Response of the `check` endpoint: metadata for a URL plus the existing
/// bookmark when the URL is already saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkCheck {
    #[serde(default)]
    pub bookmark: Option<Bookmark>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

/// An uploaded file attached to a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkAsset {
    pub id: i64,
    pub bookmark: i64,
    pub asset_type: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

impl BookmarkAsset {
    /// True if this asset is an upload carrying extracted readable content.
    pub fn is_content_upload(&self) -> bool {
        self.asset_type == "upload" && self.display_name == crate::defaults::CONTENT_ASSET_NAME
    }
}

/// A tag known to the bookmark service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

/// A bundle (saved filter) on the bookmark service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub any_tags: String,
    #[serde(default)]
    pub all_tags: String,
    #[serde(default)]
    pub excluded_tags: String,
    #[serde(default)]
    pub order: i64,
}

/// Writable bundle fields, sent on create and full update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundlePayload {
    pub name: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub any_tags: String,
    #[serde(default)]
    pub all_tags: String,
    #[serde(default)]
    pub excluded_tags: String,
    #[serde(default)]
    pub order: i64,
}

/// The authenticated user's profile on the bookmark service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub bookmark_date_display: Option<String>,
    #[serde(default)]
    pub bookmark_link_target: Option<String>,
    #[serde(default)]
    pub web_archive_integration: Option<String>,
    #[serde(default)]
    pub tag_search: Option<String>,
    #[serde(default)]
    pub enable_sharing: bool,
    #[serde(default)]
    pub enable_public_sharing: bool,
    #[serde(default)]
    pub enable_favicons: bool,
    #[serde(default)]
    pub display_url: bool,
    #[serde(default)]
    pub permanent_notes: bool,
    #[serde(default)]
    pub search_preferences: Option<JsonValue>,
}

// =============================================================================
// WEB SEARCH TYPES
// =============================================================================

/// A single ranked result from the web search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// Status of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// The kinds of work the pipeline dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Walk the full bookmark listing and detect unseen bookmarks.
    SyncSweep,
    /// Propose and merge new tags via the chat collaborator.
    Autotag,
    /// Extract readable page content into notes and a content asset.
    Readability,
    /// Summarize extracted content into the bookmark description.
    Summarize,
    /// Resolve a saved search-results bookmark to its first hit.
    Search,
}

impl JobType {
    /// Default queue priority for this job type (higher runs first).
    ///
    /// The sweep outranks everything so new bookmarks are detected promptly;
    /// search outranks the tasks it re-submits.
    pub fn default_priority(self) -> i32 {
        match self {
            JobType::SyncSweep => 9,
            JobType::Search => 5,
            JobType::Autotag => 3,
            JobType::Readability => 3,
            JobType::Summarize => 2,
        }
    }
}

/// A background job in the dispatch queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    /// Bookmark this job operates on; absent for the sync sweep.
    pub bookmark_id: Option<i64>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub priority: i32,
    pub payload: Option<JsonValue>,
    pub result: Option<JsonValue>,
    pub error_message: Option<String>,
    pub progress_percent: i32,
    pub progress_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: i64,
    pub processing: i64,
    pub completed_last_hour: i64,
    pub failed_last_hour: i64,
    pub total: i64,
}
