//! Markdown export of a processed page.
//!
//! [`build_document`] and [`suggest_filename`] are pure string assembly;
//! [`MarkdownExporter`] ties them to a [`FileSaver`] that decides where the
//! bytes end up.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use glean_common::{GleanError, Result};

pub const MARKDOWN_MIME: &str = "text/markdown";

/// Assemble the exported document.
///
/// ```
/// let doc = glean_export::build_document("My Title!", "example.com", "2024-01-01", "orig", "res");
/// assert!(doc.starts_with("# My Title! - example.com\n"));
/// ```
pub fn build_document(
    title: &str,
    source: &str,
    date: &str,
    original_text: &str,
    result_text: &str,
) -> String {
    format!(
        "# {title} - {source}\n\n\
         Summary or Persian Translation\n\
         Generated on: {date}\n\n\
         ## Original Text\n\n\
         {original_text}\n\n\
         ## Summary or Translation\n\n\
         {result_text}"
    )
}

/// `<title>-<source>-<date>.md`, with the title reduced to lower-case ASCII
/// alphanumerics separated by single dashes.
pub fn suggest_filename(title: &str, source: &str, date: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let source = source.to_lowercase();

    if slug.is_empty() {
        format!("{source}-{date}.md")
    } else {
        format!("{slug}-{source}-{date}.md")
    }
}

/// Today's date in UTC as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Where exported documents go. Implementations own naming conflicts and any
/// download lifecycle.
#[async_trait]
pub trait FileSaver: Send + Sync {
    async fn save(&self, filename: &str, mime: &str, contents: &str) -> Result<PathBuf>;
}

/// Writes straight into a directory, creating it if needed and replacing a
/// same-named file.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, filename: &str, mime: &str, contents: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GleanError::Export(format!("{}: {e}", self.dir.display())))?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| GleanError::Export(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), mime, bytes = contents.len(), "export.saved");
        Ok(path)
    }
}

/// Everything that goes into one export.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub title: &'a str,
    pub source: &'a str,
    pub date: &'a str,
    pub original_text: &'a str,
    pub result_text: &'a str,
}

pub struct MarkdownExporter {
    saver: Arc<dyn FileSaver>,
}

impl MarkdownExporter {
    pub fn new(saver: Arc<dyn FileSaver>) -> Self {
        Self { saver }
    }

    /// Build the document and hand it to the saver. An empty result is
    /// refused with [`GleanError::NoResult`].
    pub async fn export(&self, req: &ExportRequest<'_>) -> Result<PathBuf> {
        if req.result_text.is_empty() {
            return Err(GleanError::NoResult);
        }
        let doc = build_document(
            req.title,
            req.source,
            req.date,
            req.original_text,
            req.result_text,
        );
        let filename = suggest_filename(req.title, req.source, req.date);
        self.saver.save(&filename, MARKDOWN_MIME, &doc).await
    }
}
