//! Core traits for marque abstractions.
//!
//! These traits define the seams between the pipeline and its collaborators:
//! the event log and job queue (backed by Postgres in marque-db) and the
//! external services every task depends on (chat completion, web search,
//! content extraction). Tasks hold collaborators behind these traits so they
//! can be exercised with fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::events::{Event, EventAction, EventExtra};
use crate::models::{Job, JobType, QueueStats, SearchHit};

// =============================================================================
// EVENT LOG
// =============================================================================

/// The append-only enrichment event log.
///
/// `exists` is the idempotency guard every task runs before acting; `append`
/// records a completed action. The guard and the append are deliberately
/// separate steps: two workers racing on the same `(bookmark_id, action)`
/// can both observe "not yet done" and both append, which this design
/// accepts as bounded duplication. No update or delete is exposed.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Unconditionally insert a new event record.
    async fn append(
        &self,
        bookmark_id: i64,
        action: EventAction,
        occurred_at: DateTime<Utc>,
        extra: Option<EventExtra>,
    ) -> Result<Uuid>;

    /// True if an event for `(bookmark_id, action)` has been recorded.
    async fn exists(&self, bookmark_id: i64, action: EventAction) -> Result<bool>;

    /// All events recorded for a bookmark, oldest first.
    async fn list_for_bookmark(&self, bookmark_id: i64) -> Result<Vec<Event>>;
}

// =============================================================================
// JOB QUEUE
// =============================================================================

/// The dispatch queue feeding the job worker.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Queue a new job.
    async fn queue(
        &self,
        bookmark_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> Result<Uuid>;

    /// Queue a job unless the same type is already pending or running for
    /// the same bookmark. Returns `None` when deduplicated away.
    async fn queue_deduplicated(
        &self,
        bookmark_id: Option<i64>,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> Result<Option<Uuid>>;

    /// Claim the next pending job for processing.
    async fn claim_next(&self) -> Result<Option<Job>>;

    /// Claim the next pending job whose type is in `job_types`.
    /// An empty slice means "claim any type".
    async fn claim_next_for_types(&self, job_types: &[JobType]) -> Result<Option<Job>>;

    /// Update job progress.
    async fn update_progress(
        &self,
        job_id: Uuid,
        percent: i32,
        message: Option<&str>,
    ) -> Result<()>;

    /// Mark job as completed.
    async fn complete(&self, job_id: Uuid, result: Option<JsonValue>) -> Result<()>;

    /// Mark job as failed; re-queues for retry until `max_retries` is spent.
    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()>;

    /// Get job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// All jobs recorded for a bookmark, newest first.
    async fn get_for_bookmark(&self, bookmark_id: i64) -> Result<Vec<Job>>;

    /// Number of pending jobs.
    async fn pending_count(&self) -> Result<i64>;

    /// List recent jobs.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Job>>;

    /// Get queue statistics.
    async fn queue_stats(&self) -> Result<QueueStats>;

    /// Clean up old completed/failed jobs, keeping the most recent.
    async fn cleanup(&self, keep_count: i64) -> Result<i64>;
}

// =============================================================================
// EXTERNAL COLLABORATORS
// =============================================================================

/// Backend for text generation (LLM chat completion).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for resolving a query against a web search provider.
#[async_trait]
pub trait WebSearchBackend: Send + Sync {
    /// Run the query and return ranked results, best first.
    ///
    /// An empty vector means the provider had nothing; callers treat that as
    /// "nothing to do", not as a failure.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Extracts the primary readable text content of a page.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetch the page and strip boilerplate, returning plain text.
    ///
    /// Fails with [`crate::Error::Extraction`] on low-confidence extraction,
    /// tool failure, or timeout; callers treat that as a soft miss.
    async fn extract(&self, url: &str) -> Result<String>;
}
