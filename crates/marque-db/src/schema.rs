//! Schema bootstrap for the marque tables.
//!
//! Marque owns exactly two tables: the append-only `events` log and the
//! `job_queue`. The statements are idempotent so the daemon can run them at
//! every startup.
//!
//! The `events` table deliberately has NO uniqueness constraint on
//! `(bookmark_id, action)`: idempotency is enforced by the guard checks in
//! each task, and racing workers may produce bounded duplicates.

use sqlx::postgres::PgPool;

use marque_core::{Error, Result};

const SCHEMA_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        bookmark_id BIGINT NOT NULL,
        action TEXT NOT NULL,
        occurred_at TIMESTAMPTZ NOT NULL,
        extra JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_events_bookmark_action
        ON events (bookmark_id, action)",
    "CREATE TABLE IF NOT EXISTS job_queue (
        id UUID PRIMARY KEY,
        bookmark_id BIGINT,
        job_type TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        priority INTEGER NOT NULL DEFAULT 0,
        payload JSONB,
        result JSONB,
        error_message TEXT,
        progress_percent INTEGER NOT NULL DEFAULT 0,
        progress_message TEXT,
        retry_count INTEGER NOT NULL DEFAULT 0,
        max_retries INTEGER NOT NULL DEFAULT 3,
        created_at TIMESTAMPTZ NOT NULL,
        started_at TIMESTAMPTZ,
        completed_at TIMESTAMPTZ
    )",
    "CREATE INDEX IF NOT EXISTS idx_job_queue_claim
        ON job_queue (status, priority DESC, created_at ASC)",
    "CREATE INDEX IF NOT EXISTS idx_job_queue_bookmark
        ON job_queue (bookmark_id)",
];

/// Apply the marque schema, creating anything that does not exist yet.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA_SQL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(Error::Database)?;
    }
    Ok(())
}
