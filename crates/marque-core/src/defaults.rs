//! Centralized default constants for the marque system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates and the daemon binary should reference these constants
//! instead of defining their own magic numbers.

// =============================================================================
// BOOKMARK SERVICE CLIENT
// =============================================================================

/// Request timeout for calls to the bookmark service (seconds).
pub const CLIENT_TIMEOUT_SECS: u64 = 30;

/// Default page size requested from list endpoints.
pub const PAGE_LIMIT: i64 = 100;

/// Display name of the asset that carries extracted readable content.
pub const CONTENT_ASSET_NAME: &str = "content.txt";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model.
pub const GEN_MODEL: &str = "gpt-oss:20b";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Maximum characters of extracted content fed to the summarizer prompt.
pub const SUMMARY_INPUT_MAX_CHARS: usize = 4000;

// =============================================================================
// WEB SEARCH
// =============================================================================

/// Brave web search endpoint.
pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Timeout for web search requests (seconds).
pub const SEARCH_TIMEOUT_SECS: u64 = 30;

/// Tag merged into a bookmark after saved-search resolution.
pub const FROM_SEARCH_TAG: &str = "from-search";

// =============================================================================
// CONTENT EXTRACTION
// =============================================================================

/// Timeout for the external readability subprocess (seconds).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// JOBS
// =============================================================================

/// Maximum retries for failed jobs before they are terminally failed.
pub const JOB_MAX_RETRIES: i32 = 3;

/// Polling interval for job processing when the queue is empty (milliseconds).
pub const JOB_POLL_INTERVAL_MS: u64 = 1_000;

/// Maximum number of jobs processed concurrently by one worker.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Per-job execution timeout (seconds).
pub const JOB_TIMEOUT_SECS: u64 = 300;

/// Capacity of the worker event broadcast channel.
pub const WORKER_EVENT_CAPACITY: usize = 256;

// =============================================================================
// SYNC SWEEP
// =============================================================================

/// Interval between sync sweeps of the bookmark listing (seconds).
pub const SYNC_INTERVAL_SECS: u64 = 300;
