//! Pipeline handler tests against a mock bookmark service.
//!
//! Each test wires a handler with the in-memory event log and job queue, a
//! scripted chat backend, and a wiremock stand-in for the bookmark service,
//! then asserts on the external writes and the recorded events.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marque_client::{ClientConfig, LinkdingClient};
use marque_core::{
    ContentExtractor, Error, EventAction, EventExtra, EventStore, JobRepository, JobStatus,
    JobType, Result, SearchHit, WebSearchBackend,
};
use marque_db::test_fixtures::{MemoryEventStore, MemoryJobQueue};
use marque_inference::mock::MockBackend;
use marque_jobs::{
    AutotagHandler, JobContext, JobHandler, JobResult, ReadabilityHandler, SearchFollowUps,
    SearchHandler, SummarizeHandler, SyncSweepHandler,
};

// ============================================================================
// Fakes and fixtures
// ============================================================================

struct FakeExtractor {
    response: Mutex<Option<Result<String>>>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    fn returning(text: &str) -> Self {
        Self {
            response: Mutex::new(Some(Ok(text.to_string()))),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_soft() -> Self {
        Self {
            response: Mutex::new(Some(Err(Error::Extraction("low confidence".into())))),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentExtractor for FakeExtractor {
    async fn extract(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::Extraction("exhausted".into())))
    }
}

struct FakeSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    fn returning(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearchBackend for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.clone())
    }
}

const DATE_ADDED: &str = "2026-01-02T03:04:05Z";

fn date_added() -> DateTime<Utc> {
    DATE_ADDED.parse().unwrap()
}

fn bookmark_json(id: i64, url: &str) -> serde_json::Value {
    json!({
        "id": id,
        "url": url,
        "title": format!("Bookmark {id}"),
        "description": "old description",
        "notes": "",
        "is_archived": false,
        "unread": false,
        "shared": false,
        "tag_names": ["existing"],
        "date_added": DATE_ADDED,
        "date_modified": DATE_ADDED
    })
}

fn client_for(server: &MockServer) -> Arc<LinkdingClient> {
    Arc::new(LinkdingClient::new(ClientConfig::new(server.uri(), "test-key")).unwrap())
}

fn ctx_for(job_type: JobType, bookmark_id: Option<i64>) -> JobContext {
    JobContext::new(marque_core::Job {
        id: uuid::Uuid::now_v7(),
        bookmark_id,
        job_type,
        status: JobStatus::Running,
        priority: 0,
        payload: None,
        result: None,
        error_message: None,
        progress_percent: 0,
        progress_message: None,
        retry_count: 0,
        max_retries: 3,
        created_at: Utc::now(),
        started_at: Some(Utc::now()),
        completed_at: None,
    })
}

async fn mount_get_bookmark(server: &MockServer, body: serde_json::Value) {
    let id = body["id"].as_i64().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/api/bookmarks/{id}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_empty_tags(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "name": "existing"}]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Sync sweep
// ============================================================================

#[tokio::test]
async fn test_sweep_submits_first_wave_once() {
    let server = MockServer::start().await;

    let mut archived = bookmark_json(2, "https://example.com/2");
    archived["is_archived"] = json!(true);

    Mock::given(method("GET"))
        .and(path("/api/bookmarks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [bookmark_json(1, "https://example.com/1"), archived]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let handler = SyncSweepHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
    );

    // First run: the live bookmark gets the first wave and a created event;
    // the archived one is skipped entirely.
    let result = handler.execute(ctx_for(JobType::SyncSweep, None)).await;
    assert!(matches!(result, JobResult::Success(Some(_))));

    assert_eq!(
        jobs.submissions(),
        vec![
            (Some(1), JobType::Autotag),
            (Some(1), JobType::Readability),
        ]
    );
    assert_eq!(events.count(1, EventAction::BookmarkCreated), 1);
    assert_eq!(events.count(2, EventAction::BookmarkCreated), 0);

    let created = &events.events()[0];
    assert_eq!(created.occurred_at, date_added());
    assert!(matches!(
        created.extra,
        Some(EventExtra::BookmarkSnapshot(_))
    ));

    // Second run with no state change: nothing new is submitted.
    let result = handler.execute(ctx_for(JobType::SyncSweep, None)).await;
    assert!(matches!(result, JobResult::Success(Some(_))));
    assert_eq!(jobs.submissions().len(), 2);
    assert_eq!(events.count(1, EventAction::BookmarkCreated), 1);
}

// ============================================================================
// Autotag
// ============================================================================

#[tokio::test]
async fn test_autotag_merges_proposed_tags() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/7")).await;
    mount_empty_tags(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .and(body_partial_json(json!({
            "tag_names": ["existing", "foo", "bar"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/7")))
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    chat.push_response(r#"["foo","bar"]"#);

    let handler = AutotagHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );
    let result = handler.execute(ctx_for(JobType::Autotag, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));

    assert_eq!(events.count(7, EventAction::Tagged), 1);
    let event = &events.events()[0];
    assert_eq!(event.occurred_at, date_added());
    assert_eq!(
        event.extra,
        Some(EventExtra::Tags {
            tags: vec!["foo".to_string(), "bar".to_string()]
        })
    );

    // The prompt embedded the bookmark and the vocabulary.
    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("https://example.com/7"));
    assert!(prompts[0].contains("existing"));
}

#[tokio::test]
async fn test_autotag_empty_array_is_a_noop() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/7")).await;
    mount_empty_tags(&server).await;

    // No update must be attempted.
    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    chat.push_response("[]");

    let handler = AutotagHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );
    let result = handler.execute(ctx_for(JobType::Autotag, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(events.count(7, EventAction::Tagged), 0);
}

#[tokio::test]
async fn test_autotag_noop_after_tagged_event() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/7")).await;

    let events = Arc::new(MemoryEventStore::new());
    events
        .append(7, EventAction::Tagged, Utc::now(), None)
        .await
        .unwrap();

    let chat = Arc::new(MockBackend::new());
    let handler = AutotagHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );
    let result = handler.execute(ctx_for(JobType::Autotag, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));

    // Never reached the chat collaborator, never wrote a second event.
    assert_eq!(chat.call_count(), 0);
    assert_eq!(events.count(7, EventAction::Tagged), 1);
}

#[tokio::test]
async fn test_autotag_skips_archived_bookmark() {
    let server = MockServer::start().await;
    let mut body = bookmark_json(7, "https://example.com/7");
    body["is_archived"] = json!(true);
    mount_get_bookmark(&server, body).await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    let handler = AutotagHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Autotag, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(chat.call_count(), 0);
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_autotag_malformed_json_fails_the_job() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/7")).await;
    mount_empty_tags(&server).await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    chat.push_response("here are some tags: rust, web");

    let handler = AutotagHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat,
    );
    let result = handler.execute(ctx_for(JobType::Autotag, Some(7))).await;
    match result {
        JobResult::Failed(message) => assert!(message.contains("malformed")),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(events.events().is_empty());
}

// ============================================================================
// Readability
// ============================================================================

#[tokio::test]
async fn test_readability_aborts_on_malformed_url() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "not a url")).await;

    let events = Arc::new(MemoryEventStore::new());
    let extractor = Arc::new(FakeExtractor::returning("text"));
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        extractor.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(extractor.call_count(), 0);
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_readability_writes_notes_asset_and_event() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .and(body_partial_json(json!({
            "notes": "Content:\n\nthe readable text"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/article")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/bookmarks/7/assets/upload/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "bookmark": 7,
            "asset_type": "upload",
            "display_name": "content.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        Arc::new(FakeExtractor::returning("the readable text")),
    );

    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));

    assert_eq!(events.count(7, EventAction::ReadabilityExtracted), 1);
    assert_eq!(
        events.events()[0].extra,
        Some(EventExtra::Extraction {
            url: "https://example.com/article".to_string(),
            content_length: "the readable text".chars().count(),
        })
    );
}

#[tokio::test]
async fn test_readability_appends_after_existing_notes() {
    let server = MockServer::start().await;
    let mut body = bookmark_json(7, "https://example.com/article");
    body["notes"] = json!("my own note");
    mount_get_bookmark(&server, body).await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .and(body_partial_json(json!({
            "notes": "my own note\n\n---\n\nContent:\n\nthe readable text"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/article")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/bookmarks/7/assets/upload/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "bookmark": 7,
            "asset_type": "upload",
            "display_name": "content.txt"
        })))
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        Arc::new(FakeExtractor::returning("the readable text")),
    );

    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));
}

#[tokio::test]
async fn test_readability_extraction_miss_is_soft() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        Arc::new(FakeExtractor::failing_soft()),
    );

    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_readability_survives_asset_upload_failure() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/article")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/bookmarks/7/assets/upload/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        Arc::new(FakeExtractor::returning("the readable text")),
    );

    // The notes update succeeded, so the task still completes and records
    // the extraction.
    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));
    assert_eq!(events.count(7, EventAction::ReadabilityExtracted), 1);
}

#[tokio::test]
async fn test_readability_noop_after_extracted_event() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;

    let events = Arc::new(MemoryEventStore::new());
    events
        .append(7, EventAction::ReadabilityExtracted, Utc::now(), None)
        .await
        .unwrap();

    let extractor = Arc::new(FakeExtractor::returning("text"));
    let handler = ReadabilityHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        extractor.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Readability, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(extractor.call_count(), 0);
    assert_eq!(events.count(7, EventAction::ReadabilityExtracted), 1);
}

// ============================================================================
// Summarize
// ============================================================================

async fn mount_assets(server: &MockServer, results: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/bookmarks/7/assets/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": results.as_array().map(|a| a.len()).unwrap_or(0),
            "next": null,
            "previous": null,
            "results": results
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_summarize_aborts_without_content_asset() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;
    mount_assets(&server, json!([])).await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    let handler = SummarizeHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Summarize, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(chat.call_count(), 0);
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_summarize_ignores_non_content_assets() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;
    mount_assets(
        &server,
        json!([
            {"id": 1, "bookmark": 7, "asset_type": "snapshot", "display_name": "content.txt"},
            {"id": 2, "bookmark": 7, "asset_type": "upload", "display_name": "page.html"}
        ]),
    )
    .await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    let handler = SummarizeHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Summarize, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert_eq!(chat.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_writes_description_and_event() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;
    mount_assets(
        &server,
        json!([
            {"id": 3, "bookmark": 7, "asset_type": "upload", "display_name": "content.txt"}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/bookmarks/7/assets/3/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"long article text".to_vec()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .and(body_partial_json(json!({
            "description": "A crisp two sentence summary."
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/article")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    chat.push_response("  A crisp two sentence summary.  ");

    let handler = SummarizeHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );

    let result = handler.execute(ctx_for(JobType::Summarize, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));

    assert_eq!(events.count(7, EventAction::Summarized), 1);
    assert_eq!(
        events.events()[0].extra,
        Some(EventExtra::Summary {
            url: "https://example.com/article".to_string(),
            original_description: "old description".to_string(),
            summary_length: "A crisp two sentence summary.".chars().count(),
        })
    );

    // The downloaded content made it into the prompt.
    assert!(chat.prompts()[0].contains("long article text"));
}

#[tokio::test]
async fn test_summarize_truncates_long_content() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/article")).await;
    mount_assets(
        &server,
        json!([
            {"id": 3, "bookmark": 7, "asset_type": "upload", "display_name": "content.txt"}
        ]),
    )
    .await;

    let long_content = "x".repeat(10_000);
    Mock::given(method("GET"))
        .and(path("/api/bookmarks/7/assets/3/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(long_content.into_bytes()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/article")),
        )
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let chat = Arc::new(MockBackend::new());
    chat.push_response("summary");

    let handler = SummarizeHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        chat.clone(),
    );
    handler.execute(ctx_for(JobType::Summarize, Some(7))).await;

    let prompt = &chat.prompts()[0];
    let xs = prompt.chars().filter(|c| *c == 'x').count();
    assert_eq!(xs, 4000, "content must be truncated to 4000 chars");
}

// ============================================================================
// Search
// ============================================================================

fn search_hit() -> SearchHit {
    SearchHit {
        url: "https://doc.rust-lang.org/book/ownership.html".to_string(),
        title: "Understanding Ownership".to_string(),
        description: "Ownership is Rust's most unique feature.".to_string(),
    }
}

#[tokio::test]
async fn test_search_disabled_without_backend() {
    let server = MockServer::start().await;
    // No mocks at all: a disabled handler must not even fetch the bookmark.

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        None,
    );

    let result = handler.execute(ctx_for(JobType::Search, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert!(events.events().is_empty());
    assert!(jobs.jobs().is_empty());
}

#[tokio::test]
async fn test_search_aborts_without_query_string() {
    let server = MockServer::start().await;
    mount_get_bookmark(&server, bookmark_json(7, "https://example.com/plain-page")).await;

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let search = Arc::new(FakeSearch::returning(vec![search_hit()]));
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        Some(search.clone()),
    );

    let result = handler.execute(ctx_for(JobType::Search, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert!(search.queries().is_empty());
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_search_resolves_and_resubmits_follow_ups() {
    let server = MockServer::start().await;
    mount_get_bookmark(
        &server,
        bookmark_json(7, "https://x.test/search?q=rust+ownership"),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .and(body_partial_json(json!({
            "url": "https://doc.rust-lang.org/book/ownership.html",
            "title": "Understanding Ownership",
            "description": "Ownership is Rust's most unique feature.",
            "tag_names": ["existing", "from-search"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/7")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let search = Arc::new(FakeSearch::returning(vec![search_hit()]));
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        Some(search.clone()),
    );

    let result = handler.execute(ctx_for(JobType::Search, Some(7))).await;
    assert!(matches!(result, JobResult::Success(Some(_))));

    // Query extracted with plus-decoding.
    assert_eq!(search.queries(), vec!["rust ownership"]);

    // Event records the query and the pre-resolution URL.
    assert_eq!(events.count(7, EventAction::Searched), 1);
    assert_eq!(
        events.events()[0].extra,
        Some(EventExtra::Search {
            query: "rust ownership".to_string(),
            original_url: "https://x.test/search?q=rust+ownership".to_string(),
        })
    );

    // Content-driven tasks re-submitted for the resolved destination.
    assert_eq!(
        jobs.submissions(),
        vec![
            (Some(7), JobType::Autotag),
            (Some(7), JobType::Readability),
        ]
    );
}

#[tokio::test]
async fn test_search_follow_ups_can_include_summarize() {
    let server = MockServer::start().await;
    mount_get_bookmark(
        &server,
        bookmark_json(7, "https://x.test/search?q=rust+ownership"),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/api/bookmarks/7/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(bookmark_json(7, "https://example.com/7")),
        )
        .mount(&server)
        .await;

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        Some(Arc::new(FakeSearch::returning(vec![search_hit()]))),
    )
    .with_follow_ups(SearchFollowUps::new().with_summarize(true));

    handler.execute(ctx_for(JobType::Search, Some(7))).await;

    assert_eq!(
        jobs.submissions(),
        vec![
            (Some(7), JobType::Autotag),
            (Some(7), JobType::Readability),
            (Some(7), JobType::Summarize),
        ]
    );
}

#[tokio::test]
async fn test_search_empty_results_is_a_noop() {
    let server = MockServer::start().await;
    mount_get_bookmark(
        &server,
        bookmark_json(7, "https://x.test/search?q=rust+ownership"),
    )
    .await;

    let events = Arc::new(MemoryEventStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        Some(Arc::new(FakeSearch::returning(vec![]))),
    );

    let result = handler.execute(ctx_for(JobType::Search, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert!(events.events().is_empty());
    assert!(jobs.jobs().is_empty());
}

#[tokio::test]
async fn test_search_noop_after_searched_event() {
    let server = MockServer::start().await;
    mount_get_bookmark(
        &server,
        bookmark_json(7, "https://x.test/search?q=rust+ownership"),
    )
    .await;

    let events = Arc::new(MemoryEventStore::new());
    events
        .append(7, EventAction::Searched, Utc::now(), None)
        .await
        .unwrap();

    let jobs = Arc::new(MemoryJobQueue::new());
    let search = Arc::new(FakeSearch::returning(vec![search_hit()]));
    let handler = SearchHandler::new(
        client_for(&server),
        events.clone() as Arc<dyn EventStore>,
        jobs.clone() as Arc<dyn JobRepository>,
        Some(search.clone()),
    );

    let result = handler.execute(ctx_for(JobType::Search, Some(7))).await;
    assert!(matches!(result, JobResult::Success(None)));
    assert!(search.queries().is_empty());
    assert_eq!(events.count(7, EventAction::Searched), 1);
}
