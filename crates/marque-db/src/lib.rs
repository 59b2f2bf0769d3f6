//! # marque-db
//!
//! PostgreSQL persistence layer for marque.
//!
//! This crate provides:
//! - Connection pool management
//! - The append-only enrichment event log ([`PgEventRepository`])
//! - The background job queue ([`PgJobRepository`], claimed with
//!   `FOR UPDATE SKIP LOCKED` for concurrent workers)
//! - Idempotent schema bootstrap
//! - In-memory fakes for tests ([`test_fixtures`])
//!
//! The event log and the job queue are the only state marque owns; bookmark
//! data lives exclusively in the external service.
//!
//! ## Example
//!
//! ```rust,ignore
//! use marque_db::Database;
//! use marque_core::{EventAction, EventStore};
//!
//! let db = Database::connect("postgres://localhost/marque").await?;
//! db.init_schema().await?;
//!
//! if !db.events.exists(42, EventAction::Tagged).await? {
//!     // ... perform the side effect, then record it
//! }
//! ```

pub mod events;
pub mod jobs;
pub mod pool;
pub mod schema;

// Test fixtures for integration tests.
// Always compiled so dependent crates' tests can use the in-memory fakes.
pub mod test_fixtures;

// Re-export core types
pub use marque_core::*;

pub use events::PgEventRepository;
pub use jobs::PgJobRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema::apply_schema;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Append-only enrichment event log.
    pub events: PgEventRepository,
    /// Background job queue.
    pub jobs: PgJobRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            events: PgEventRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Apply the marque schema, creating missing tables and indexes.
    pub async fn init_schema(&self) -> Result<()> {
        apply_schema(&self.pool).await
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
