//! Event log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use marque_core::{new_v7, Error, Event, EventAction, EventExtra, EventStore, Result};

/// PostgreSQL implementation of the append-only [`EventStore`].
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_event_row(row: sqlx::postgres::PgRow) -> Result<Event> {
        let action_str: String = row.get("action");
        let action = EventAction::parse(&action_str).ok_or_else(|| {
            Error::Serialization(format!("unknown event action in database: {action_str:?}"))
        })?;

        let extra: Option<serde_json::Value> = row.get("extra");
        let extra = extra
            .map(serde_json::from_value::<EventExtra>)
            .transpose()
            .map_err(|e| Error::Serialization(format!("malformed event extra: {e}")))?;

        Ok(Event {
            id: row.get("id"),
            bookmark_id: row.get("bookmark_id"),
            action,
            occurred_at: row.get("occurred_at"),
            extra,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl EventStore for PgEventRepository {
    async fn append(
        &self,
        bookmark_id: i64,
        action: EventAction,
        occurred_at: DateTime<Utc>,
        extra: Option<EventExtra>,
    ) -> Result<Uuid> {
        let id = new_v7();
        let now = Utc::now();
        let extra_json = extra.map(serde_json::to_value).transpose()?;

        sqlx::query(
            "INSERT INTO events (id, bookmark_id, action, occurred_at, extra, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)",
        )
        .bind(id)
        .bind(bookmark_id)
        .bind(action.as_str())
        .bind(occurred_at)
        .bind(&extra_json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "events",
            op = "append",
            bookmark_id,
            action = %action,
            "Recorded enrichment event"
        );
        Ok(id)
    }

    async fn exists(&self, bookmark_id: i64, action: EventAction) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE bookmark_id = $1 AND action = $2)",
        )
        .bind(bookmark_id)
        .bind(action.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(exists)
    }

    async fn list_for_bookmark(&self, bookmark_id: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            "SELECT id, bookmark_id, action, occurred_at, extra, created_at, updated_at
             FROM events
             WHERE bookmark_id = $1
             ORDER BY occurred_at ASC, created_at ASC",
        )
        .bind(bookmark_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_event_row).collect()
    }
}
