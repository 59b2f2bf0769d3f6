//! Dispatch graph declarations.
//!
//! The ordering between tasks is expressed as data here rather than as ad
//! hoc calls inside handlers, so the fan-out is inspectable and testable:
//! the sync sweep submits the first wave, and the search task re-submits its
//! follow-ups after it rewrites the bookmark.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use marque_core::{JobRepository, JobType, Result};

/// The tasks submitted immediately when a new bookmark is detected.
///
/// Search and Summarize are reachable only transitively: Summarize depends
/// on Readability's content asset, and Search re-submits the first wave
/// itself after resolving a saved search.
pub fn first_wave() -> [JobType; 2] {
    [JobType::Autotag, JobType::Readability]
}

/// Follow-up tasks the search handler schedules after mutating a bookmark's
/// URL and content.
#[derive(Debug, Clone)]
pub struct SearchFollowUps {
    resubmit_summarize: bool,
}

impl SearchFollowUps {
    /// Autotag and Readability only (the default pipeline).
    pub fn new() -> Self {
        Self {
            resubmit_summarize: false,
        }
    }

    /// Also re-submit Summarize after a resolved search.
    pub fn with_summarize(mut self, enabled: bool) -> Self {
        self.resubmit_summarize = enabled;
        self
    }

    /// The follow-up job types, in submission order.
    pub fn job_types(&self) -> Vec<JobType> {
        let mut types = vec![JobType::Autotag, JobType::Readability];
        if self.resubmit_summarize {
            types.push(JobType::Summarize);
        }
        types
    }
}

impl Default for SearchFollowUps {
    fn default() -> Self {
        Self::new()
    }
}

/// Submit one job per type for a bookmark, deduplicated against jobs already
/// pending or running for it.
pub async fn submit_for_bookmark(
    jobs: &Arc<dyn JobRepository>,
    bookmark_id: i64,
    types: &[JobType],
    payload: Option<JsonValue>,
) -> Result<()> {
    for job_type in types {
        jobs.queue_deduplicated(
            Some(bookmark_id),
            *job_type,
            job_type.default_priority(),
            payload.clone(),
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_wave_is_autotag_and_readability() {
        assert_eq!(first_wave(), [JobType::Autotag, JobType::Readability]);
    }

    #[test]
    fn test_search_follow_ups_default() {
        let follow_ups = SearchFollowUps::new();
        assert_eq!(
            follow_ups.job_types(),
            vec![JobType::Autotag, JobType::Readability]
        );
    }

    #[test]
    fn test_search_follow_ups_with_summarize() {
        let follow_ups = SearchFollowUps::new().with_summarize(true);
        assert_eq!(
            follow_ups.job_types(),
            vec![JobType::Autotag, JobType::Readability, JobType::Summarize]
        );
    }
}
