//! marqued - bookmark enrichment daemon.
//!
//! Wires the bookmark service client, the Postgres event log and job queue,
//! the chat and search collaborators, and the job worker together, then
//! enqueues a sync sweep on a fixed interval until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marque_client::LinkdingClient;
use marque_core::{defaults, JobRepository, JobType};
use marque_db::Database;
use marque_inference::OllamaBackend;
use marque_jobs::{
    AutotagHandler, BraveSearch, ReadabilityCli, ReadabilityHandler, SearchFollowUps,
    SearchHandler, SummarizeHandler, SyncSweepHandler, WorkerBuilder, WorkerConfig,
};

struct DaemonConfig {
    database_url: String,
    sync_interval: Duration,
    search_resubmits_summarize: bool,
}

impl DaemonConfig {
    fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL is required")?;

        let sync_interval_secs = std::env::var("SYNC_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SYNC_INTERVAL_SECS);

        let search_resubmits_summarize = std::env::var("SEARCH_RESUBMITS_SUMMARIZE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            sync_interval: Duration::from_secs(sync_interval_secs),
            search_resubmits_summarize,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "marqued=info,marque_jobs=info,marque_db=info,marque_client=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DaemonConfig::from_env()?;

    // Missing bookmark-service credentials are a hard startup failure.
    let client = Arc::new(LinkdingClient::from_env()?);

    let db = Database::connect(&config.database_url).await?;
    db.init_schema().await?;

    let events = Arc::new(db.events);
    let jobs: Arc<dyn JobRepository> = Arc::new(db.jobs);

    let chat = Arc::new(OllamaBackend::from_env()?);
    let extractor = Arc::new(ReadabilityCli::new());

    // A missing search credential soft-disables the search task.
    let search = BraveSearch::from_env()?.map(|backend| {
        Arc::new(backend) as Arc<dyn marque_core::WebSearchBackend>
    });
    if search.is_none() {
        warn!("BRAVE_API_KEY not set; saved-search resolution is disabled");
    }

    let follow_ups = SearchFollowUps::new().with_summarize(config.search_resubmits_summarize);

    let worker = WorkerBuilder::new(jobs.clone())
        .with_config(WorkerConfig::from_env())
        .with_handler(SyncSweepHandler::new(
            client.clone(),
            events.clone(),
            jobs.clone(),
        ))
        .with_handler(AutotagHandler::new(
            client.clone(),
            events.clone(),
            chat.clone(),
        ))
        .with_handler(ReadabilityHandler::new(
            client.clone(),
            events.clone(),
            extractor,
        ))
        .with_handler(SummarizeHandler::new(
            client.clone(),
            events.clone(),
            chat,
        ))
        .with_handler(
            SearchHandler::new(client, events, jobs.clone(), search)
                .with_follow_ups(follow_ups),
        )
        .build()
        .await;

    let handle = worker.start();

    info!(
        sync_interval_secs = config.sync_interval.as_secs(),
        "marqued started"
    );

    let mut interval = tokio::time::interval(config.sync_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match jobs
                    .queue_deduplicated(None, JobType::SyncSweep, JobType::SyncSweep.default_priority(), None)
                    .await
                {
                    Ok(Some(job_id)) => info!(%job_id, "Queued sync sweep"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Failed to queue sync sweep"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    handle.shutdown().await?;
    info!("marqued stopped");
    Ok(())
}
