//! Small reqwest wrapper: one attempt per call, body always read as text.
//!
//! Status codes are not interpreted here. Callers get a [`RawResponse`] for
//! every answer the server gives, success or not, and only transport
//! failures come back as [`HttpError`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), glean_http::HttpError> {
//! use glean_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.example.com/v1/")?;
//! let resp = client.get_text("items", RequestOpts::default()).await?;
//! if resp.is_success() {
//!     println!("{}", resp.body);
//! }
//! # Ok(()) }
//! ```
//!
//! Logging never includes the bearer token. Set `GLEAN_HTTP_RAW=1` to also
//! log each request as a curl command and each full response body under the
//! `http.raw` target.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

const RAW_ENV: &str = "GLEAN_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    /// The bearer token cannot be sent as a header value.
    #[error("{0}")]
    Credential(String),
}

#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    /// Overrides the client timeout; with neither set there is no timeout.
    pub timeout: Option<Duration>,
    /// Sent as `Authorization: Bearer <token>` after trimming.
    pub bearer: Option<&'a str>,
    pub headers: Option<HeaderMap>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Client whose relative paths resolve against `base`; an empty path
    /// means `base` itself.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn get_text(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError> {
        self.send(Method::GET, path, None, opts).await
    }

    /// POST `body` as JSON. Non-2xx answers are returned, not raised.
    pub async fn post_json_raw<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send(Method::POST, path, Some(bytes), opts).await
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if path.is_empty() {
            return Ok(self.base.clone());
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError> {
        let url = self.resolve(path)?;
        let timeout = opts.timeout.or(self.timeout);
        let req_id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);

        let mut headers = opts.headers.unwrap_or_default();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = opts.bearer {
            headers.insert(AUTHORIZATION, bearer_header(token)?);
        }

        tracing::debug!(
            req_id,
            %method,
            host = url.host_str().unwrap_or("-"),
            path = url.path(),
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            authenticated = opts.bearer.is_some(),
            body_len = body.as_ref().map_or(0, Vec::len),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, body.as_deref());
            tracing::debug!(target: "http.raw", req_id, %curl, "request");
        }

        let mut rb = self.inner.request(method, url).headers(headers);
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }
        if let Some(bytes) = body {
            rb = rb.body(bytes);
        }

        let started = Instant::now();
        let resp = rb.send().await.map_err(|e| network_error(req_id, "send", e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error(req_id, "body", e))?;
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(req_id, %status, duration_ms, body_len = body.len(), "http.response.headers");
        if raw_enabled() {
            let mut text = body.clone();
            let truncated = text.len() > RAW_MAX_BODY;
            truncate_at_char_boundary(&mut text, RAW_MAX_BODY);
            tracing::debug!(
                target: "http.raw",
                req_id,
                %status,
                headers = ?redact_headers(&headers),
                body = %text,
                truncated,
                "response"
            );
        }
        if !status.is_success() {
            tracing::warn!(req_id, %status, body_snippet = %snip_body(&body), "http.error");
        }

        Ok(RawResponse { status, body })
    }
}

fn network_error(req_id: u64, stage: &'static str, err: reqwest::Error) -> HttpError {
    let message = err.to_string();
    tracing::warn!(req_id, stage, %message, "http.error");
    HttpError::Network(message)
}

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Build the `Authorization` value from a key. Only surrounding whitespace is
/// dropped; a key that cannot travel as a header is refused before a request
/// is made.
fn bearer_header(raw: &str) -> Result<HeaderValue, HttpError> {
    let token = raw.trim();

    if !token.is_ascii() {
        return Err(HttpError::Credential("API key contains non-ASCII characters".into()));
    }
    if token.bytes().any(|b| b.is_ascii_control()) {
        return Err(HttpError::Credential("API key contains control characters".into()));
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name == AUTHORIZATION {
                "Bearer <redacted>".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

/// Curl equivalent of a request for reproducing it by hand, secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let quote = |s: &str| format!("'{}'", s.replace('\'', r"'\''"));
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, value) in redact_headers(headers) {
        parts.push(format!("-H {}", quote(&format!("{name}: {value}"))));
    }
    match body.map(std::str::from_utf8) {
        Some(Ok(text)) => {
            let mut text = text.to_string();
            truncate_at_char_boundary(&mut text, RAW_MAX_BODY);
            parts.push(format!("-d {}", quote(&text)));
        }
        Some(Err(_)) => parts.push("--data-binary @-".to_string()),
        None => {}
    }
    parts.push(quote(url.as_str()));
    parts.join(" ")
}

fn snip_body(body: &str) -> String {
    if body.len() <= SNIPPET_MAX {
        return body.to_string();
    }
    let mut snip = body.to_string();
    truncate_at_char_boundary(&mut snip, SNIPPET_MAX);
    snip.push_str("...");
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
