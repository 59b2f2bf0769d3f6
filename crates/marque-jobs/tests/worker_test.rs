//! Worker loop tests over the in-memory queue.

use std::sync::Arc;

use marque_core::{JobRepository, JobStatus, JobType};
use marque_db::test_fixtures::MemoryJobQueue;
use marque_jobs::{NoOpHandler, WorkerBuilder, WorkerConfig, WorkerEvent};

#[tokio::test]
async fn test_worker_processes_queued_job() {
    let queue = Arc::new(MemoryJobQueue::new());
    let job_id = queue
        .queue(Some(1), JobType::Autotag, 3, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone() as Arc<dyn JobRepository>)
        .with_config(WorkerConfig::default().with_poll_interval(10))
        .with_handler(NoOpHandler::new(JobType::Autotag))
        .build()
        .await;

    let handle = worker.start();
    let mut events = handle.events();

    // Wait until the worker reports the job done.
    let completed = loop {
        match events.recv().await.unwrap() {
            WorkerEvent::JobCompleted { job_id, .. } => break job_id,
            WorkerEvent::JobFailed { error, .. } => panic!("job failed: {error}"),
            _ => {}
        }
    };
    assert_eq!(completed, job_id);

    let job = queue.get(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress_percent, 100);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_only_claims_registered_types() {
    let queue = Arc::new(MemoryJobQueue::new());
    queue
        .queue(Some(1), JobType::Summarize, 2, None)
        .await
        .unwrap();
    let handled_id = queue
        .queue(Some(1), JobType::Autotag, 3, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone() as Arc<dyn JobRepository>)
        .with_config(WorkerConfig::default().with_poll_interval(10))
        .with_handler(NoOpHandler::new(JobType::Autotag))
        .build()
        .await;

    let handle = worker.start();
    let mut events = handle.events();
    loop {
        if let WorkerEvent::JobCompleted { job_id, .. } = events.recv().await.unwrap() {
            assert_eq!(job_id, handled_id);
            break;
        }
    }
    handle.shutdown().await.unwrap();

    // The summarize job stays pending: no handler was registered for it.
    assert_eq!(queue.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_disabled_worker_claims_nothing() {
    let queue = Arc::new(MemoryJobQueue::new());
    queue
        .queue(Some(1), JobType::Autotag, 3, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone() as Arc<dyn JobRepository>)
        .with_config(WorkerConfig::default().with_enabled(false))
        .with_handler(NoOpHandler::new(JobType::Autotag))
        .build()
        .await;

    let handle = worker.start();
    // Give the (disabled) worker a moment; nothing should be claimed.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(queue.pending_count().await.unwrap(), 1);
    drop(handle);
}
