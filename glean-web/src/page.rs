use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use glean_common::{GleanError, Result};
use glean_http::{HttpClient, RequestOpts};
use scraper::{Html, Selector};
use url::Url;

/// Hostname reported for pages that did not come from a URL.
pub const LOCAL_SOURCE: &str = "local";

/// A loaded page: where it came from, its title, its markup and an optional
/// user selection.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Option<Url>,
    pub title: String,
    pub html: String,
    pub selection: Option<String>,
}

impl Page {
    /// Build a page from raw markup, reading the title out of `<title>`.
    pub fn from_html(url: Option<Url>, html: impl Into<String>) -> Self {
        let html = html.into();
        let title = parse_title(&html);
        Self {
            url,
            title,
            html,
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    /// Hostname of the page URL, or [`LOCAL_SOURCE`].
    pub fn source_host(&self) -> String {
        self.url
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_string)
            .unwrap_or_else(|| LOCAL_SOURCE.to_string())
    }
}

fn parse_title(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse("title") else {
        return String::new();
    };
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self) -> Result<Page>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Fetches a page over HTTP(S).
pub struct HttpPageSource {
    url: Url,
    client: HttpClient,
}

impl HttpPageSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = HttpClient::new(url.as_str())
            .map_err(|e| GleanError::Page(e.to_string()))?
            .with_timeout(timeout);
        Ok(Self { url, client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(&self) -> Result<Page> {
        tracing::info!(url = %self.url, "page.fetch.start");
        let resp = self
            .client
            .get_text("", RequestOpts::default())
            .await
            .map_err(|e| GleanError::Page(format!("could not fetch {}: {e}", self.url)))?;

        if !resp.is_success() {
            return Err(GleanError::Page(format!(
                "GET {} returned {}",
                self.url, resp.status
            )));
        }

        let page = Page::from_html(Some(self.url.clone()), resp.body);
        tracing::info!(url = %self.url, title = %page.title, bytes = page.html.len(), "page.fetch.done");
        Ok(page)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Reads a page from a local HTML file.
pub struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn load(&self) -> Result<Page> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| GleanError::Page(format!("{}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), bytes = html.len(), "page.file.read");
        Ok(Page::from_html(None, html))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
