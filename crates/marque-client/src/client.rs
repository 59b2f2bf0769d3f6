//! Typed HTTP access to a linkding-compatible bookmark service.
//!
//! One method per resource/verb. Every response goes through the same status
//! classification: 2xx parses, 401 is an authentication failure, 404 is not
//! found, 400/422 is a validation error with the message extracted from the
//! body, and anything else surfaces as a generic HTTP error carrying status
//! and body.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;
use url::Url;

use marque_core::defaults::CLIENT_TIMEOUT_SECS;
use marque_core::{
    Bookmark, BookmarkAsset, BookmarkCheck, BookmarkPayload, Bundle, BundlePayload, Error, Result,
    Tag, UserProfile,
};

/// Environment variable naming the bookmark service host URL.
pub const HOST_ENV: &str = "LINKDING_HOST";

/// Environment variable naming the bookmark service API key.
pub const API_KEY_ENV: &str = "LINKDING_API_KEY";

/// Configuration for [`LinkdingClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the bookmark service, e.g. `https://links.example.com`.
    pub host: String,
    /// API token, sent as `Authorization: Token <key>`.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a config with the default request timeout.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            timeout_secs: CLIENT_TIMEOUT_SECS,
        }
    }

    /// Read host and API key from `LINKDING_HOST` / `LINKDING_API_KEY`.
    ///
    /// Missing variables yield empty strings; [`LinkdingClient::new`] turns
    /// those into an [`Error::Unconfigured`] before any network call.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(HOST_ENV).unwrap_or_default(),
            std::env::var(API_KEY_ENV).unwrap_or_default(),
        )
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total item count across all pages, as reported by the server.
    pub count: i64,
    /// Absolute URL of the next page, absent on the last page.
    pub next: Option<String>,
    /// Absolute URL of the previous page, absent on the first page.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Free-text search filter.
    pub q: Option<String>,
}

impl ListParams {
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    fn as_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(ref q) = self.q {
            pairs.push(("q", q.clone()));
        }
        pairs
    }
}

#[derive(Serialize)]
struct CreateTagRequest<'a> {
    name: &'a str,
}

/// Client for a linkding-compatible bookmark HTTP API.
///
/// Stateless per call and safe to share across concurrent tasks.
#[derive(Debug)]
pub struct LinkdingClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl LinkdingClient {
    /// Build a client, failing immediately when host or API key is missing.
    ///
    /// This happens before any network call so a misconfigured process dies
    /// at startup instead of on first use.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(Error::Unconfigured(format!(
                "bookmark service host is required; set {HOST_ENV} or configure it explicitly"
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(Error::Unconfigured(format!(
                "bookmark service API key is required; set {API_KEY_ENV} or configure it explicitly"
            )));
        }

        let base_url = Url::parse(config.host.trim())
            .map_err(|e| Error::Unconfigured(format!("invalid bookmark service host: {e}")))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("marque/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Build a client from `LINKDING_HOST` / `LINKDING_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    pub async fn list_bookmarks(&self, params: &ListParams) -> Result<Page<Bookmark>> {
        self.get_page("api/bookmarks/", params).await
    }

    pub async fn list_archived_bookmarks(&self, params: &ListParams) -> Result<Page<Bookmark>> {
        self.get_page("api/bookmarks/archived/", params).await
    }

    pub async fn get_bookmark(&self, id: i64) -> Result<Bookmark> {
        self.get_json(&format!("api/bookmarks/{id}/"), &[]).await
    }

    /// Look up whether a URL is already bookmarked.
    pub async fn check_bookmark(&self, url: &str) -> Result<BookmarkCheck> {
        self.get_json("api/bookmarks/check/", &[("url", url.to_string())])
            .await
    }

    pub async fn create_bookmark(&self, payload: &BookmarkPayload) -> Result<Bookmark> {
        let request = self.http.post(self.url("api/bookmarks/")?).json(payload);
        self.send_json(request).await
    }

    /// Full-record update. Callers must send a merge of the existing bookmark
    /// plus their delta; see [`BookmarkPayload`].
    pub async fn update_bookmark(&self, id: i64, payload: &BookmarkPayload) -> Result<Bookmark> {
        let request = self
            .http
            .put(self.url(&format!("api/bookmarks/{id}/"))?)
            .json(payload);
        self.send_json(request).await
    }

    /// Partial update of individual fields.
    pub async fn patch_bookmark(&self, id: i64, fields: &JsonValue) -> Result<Bookmark> {
        let request = self
            .http
            .patch(self.url(&format!("api/bookmarks/{id}/"))?)
            .json(fields);
        self.send_json(request).await
    }

    pub async fn archive_bookmark(&self, id: i64) -> Result<()> {
        let request = self
            .http
            .post(self.url(&format!("api/bookmarks/{id}/archive/"))?);
        self.send_empty(request).await
    }

    pub async fn unarchive_bookmark(&self, id: i64) -> Result<()> {
        let request = self
            .http
            .post(self.url(&format!("api/bookmarks/{id}/unarchive/"))?);
        self.send_empty(request).await
    }

    pub async fn delete_bookmark(&self, id: i64) -> Result<()> {
        let request = self.http.delete(self.url(&format!("api/bookmarks/{id}/"))?);
        self.send_empty(request).await
    }

    // ========================================================================
    // Bookmark assets
    // ========================================================================

    pub async fn list_bookmark_assets(
        &self,
        bookmark_id: i64,
        params: &ListParams,
    ) -> Result<Page<BookmarkAsset>> {
        self.get_page(&format!("api/bookmarks/{bookmark_id}/assets/"), params)
            .await
    }

    pub async fn get_bookmark_asset(
        &self,
        bookmark_id: i64,
        asset_id: i64,
    ) -> Result<BookmarkAsset> {
        self.get_json(
            &format!("api/bookmarks/{bookmark_id}/assets/{asset_id}/"),
            &[],
        )
        .await
    }

    /// Download an asset's raw bytes.
    pub async fn download_bookmark_asset(&self, bookmark_id: i64, asset_id: i64) -> Result<Vec<u8>> {
        let url = self.url(&format!(
            "api/bookmarks/{bookmark_id}/assets/{asset_id}/download/"
        ))?;
        let response = self.authorized(self.http.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a file as a bookmark asset.
    ///
    /// Builds a multipart body with a single `file` part; the content type is
    /// guessed from the file name, falling back to `text/plain`.
    pub async fn upload_bookmark_asset(
        &self,
        bookmark_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<BookmarkAsset> {
        let mime = mime_guess::from_path(file_name).first_or(mime_guess::mime::TEXT_PLAIN);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())
            .map_err(|e| Error::InvalidInput(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .post(self.url(&format!("api/bookmarks/{bookmark_id}/assets/upload/"))?)
            .multipart(form);
        self.send_json(request).await
    }

    pub async fn delete_bookmark_asset(&self, bookmark_id: i64, asset_id: i64) -> Result<()> {
        let request = self.http.delete(self.url(&format!(
            "api/bookmarks/{bookmark_id}/assets/{asset_id}/"
        ))?);
        self.send_empty(request).await
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub async fn list_tags(&self, params: &ListParams) -> Result<Page<Tag>> {
        self.get_page("api/tags/", params).await
    }

    pub async fn get_tag(&self, id: i64) -> Result<Tag> {
        self.get_json(&format!("api/tags/{id}/"), &[]).await
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        let request = self
            .http
            .post(self.url("api/tags/")?)
            .json(&CreateTagRequest { name });
        self.send_json(request).await
    }

    // ========================================================================
    // Bundles
    // ========================================================================

    pub async fn list_bundles(&self, params: &ListParams) -> Result<Page<Bundle>> {
        self.get_page("api/bundles/", params).await
    }

    pub async fn get_bundle(&self, id: i64) -> Result<Bundle> {
        self.get_json(&format!("api/bundles/{id}/"), &[]).await
    }

    pub async fn create_bundle(&self, payload: &BundlePayload) -> Result<Bundle> {
        let request = self.http.post(self.url("api/bundles/")?).json(payload);
        self.send_json(request).await
    }

    pub async fn update_bundle(&self, id: i64, payload: &BundlePayload) -> Result<Bundle> {
        let request = self
            .http
            .put(self.url(&format!("api/bundles/{id}/"))?)
            .json(payload);
        self.send_json(request).await
    }

    pub async fn patch_bundle(&self, id: i64, fields: &JsonValue) -> Result<Bundle> {
        let request = self
            .http
            .patch(self.url(&format!("api/bundles/{id}/"))?)
            .json(fields);
        self.send_json(request).await
    }

    pub async fn delete_bundle(&self, id: i64) -> Result<()> {
        let request = self.http.delete(self.url(&format!("api/bundles/{id}/"))?);
        self.send_empty(request).await
    }

    // ========================================================================
    // User
    // ========================================================================

    pub async fn get_user_profile(&self) -> Result<UserProfile> {
        self.get_json("api/user/profile/", &[]).await
    }

    // ========================================================================
    // Pagination plumbing
    // ========================================================================

    /// Fetch one page of a listing by relative path.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
    ) -> Result<Page<T>> {
        let mut url = self.url(path)?;
        for (key, value) in params.as_query() {
            url.query_pairs_mut().append_pair(key, &value);
        }
        let request = self.http.get(url);
        self.send_json(request).await
    }

    /// Fetch one page by absolute cursor URL, exactly as the server gave it.
    pub async fn get_page_url<T: DeserializeOwned>(&self, cursor: &str) -> Result<Page<T>> {
        let url = Url::parse(cursor)
            .map_err(|e| Error::InvalidInput(format!("invalid page cursor {cursor:?}: {e}")))?;
        let request = self.http.get(url);
        self.send_json(request).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidInput(format!("invalid request path {path:?}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Token {}", self.api_key))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut url = self.url(path)?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        self.send_json(self.http.get(url)).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        handle_response(response).await
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, body))
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    debug!(
        subsystem = "client",
        status = status.as_u16(),
        url = %response.url(),
        "Bookmark service response"
    );

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse response body: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status, body))
}

fn classify_error(status: StatusCode, body: String) -> Error {
    match status.as_u16() {
        401 => Error::Authentication("check your API key".to_string()),
        404 => Error::NotFound("resource not found".to_string()),
        400 | 422 => Error::Validation(extract_error_message(&body)),
        s => Error::Http { status: s, body },
    }
}

/// Pull a human-readable message out of a validation error body.
///
/// Prefers a `detail` field, then an `errors` field (joined when it is an
/// array), then the raw body.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<JsonValue>(body) else {
        return body.to_string();
    };

    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_string();
    }

    match value.get("errors") {
        Some(JsonValue::Array(errors)) => errors
            .iter()
            .map(|e| match e {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => body.to_string(),
    }
}
