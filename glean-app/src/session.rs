//! The user-facing operations: process a page or selection, export the result.
//!
//! Every operation clears the status board, takes the [`OperationGate`],
//! reports progress on the board, and on failure logs the error and shows it
//! as a single line. The gate is released on every exit path.

use std::path::PathBuf;
use std::sync::Arc;

use glean_common::{GleanError, Result};
use glean_export::{ExportRequest, MarkdownExporter, today_utc};
use glean_llm::prompt::Action;
use glean_llm::traits::CompletionClient;
use glean_runtime::{OperationGate, StatusBoard};
use glean_store::KeyStore;
use glean_web::{ContentExtractor, Page};

pub const NO_TEXT_MESSAGE: &str = "No text found to process";

/// Which text of the page an action runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    FullPage,
    Selection,
}

pub struct Session {
    extractor: ContentExtractor,
    client: Arc<dyn CompletionClient>,
    keys: KeyStore,
    exporter: MarkdownExporter,
    gate: OperationGate,
    board: StatusBoard,
    model: String,
    explicit_key: Option<String>,
    last_result: Option<String>,
}

impl Session {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        keys: KeyStore,
        exporter: MarkdownExporter,
        model: impl Into<String>,
    ) -> Self {
        Self {
            extractor: ContentExtractor::new(),
            client,
            keys,
            exporter,
            gate: OperationGate::new(),
            board: StatusBoard::default(),
            model: model.into(),
            explicit_key: None,
            last_result: None,
        }
    }

    /// Credential to fall back on when no saved key is selected.
    pub fn with_explicit_key(mut self, key: Option<String>) -> Self {
        self.explicit_key = key;
        self
    }

    pub fn with_board(mut self, board: StatusBoard) -> Self {
        self.board = board;
        self
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    pub fn gate(&self) -> &OperationGate {
        &self.gate
    }

    /// Result of the last successful [`Session::process`].
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Run `action` over the chosen text. `Ok(None)` means there was nothing
    /// to send; the board then carries [`NO_TEXT_MESSAGE`].
    pub async fn process(
        &mut self,
        page: &Page,
        source: TextSource,
        action: Action,
    ) -> Result<Option<String>> {
        self.board.clear();
        let _token = match self.gate.begin(action.as_str()) {
            Ok(token) => token,
            Err(e) => return Err(self.fail("process", e)),
        };
        self.board.show_status("Processing...");

        match self.run_process(page, source, action).await {
            Ok(Some(result)) => {
                self.board.show_status("Processing complete");
                self.last_result = Some(result.clone());
                Ok(Some(result))
            }
            Ok(None) => {
                self.board.show_error(NO_TEXT_MESSAGE);
                Ok(None)
            }
            Err(e) => Err(self.fail("process", e)),
        }
    }

    async fn run_process(
        &self,
        page: &Page,
        source: TextSource,
        action: Action,
    ) -> Result<Option<String>> {
        let text = match source {
            TextSource::FullPage => self.extractor.extract(page)?,
            TextSource::Selection => self.extractor.extract_selection(page),
        };
        if text.is_empty() {
            return Ok(None);
        }
        tracing::info!(%action, ?source, chars = text.chars().count(), "process.start");

        let credential = self
            .keys
            .resolve_credential(self.explicit_key.as_deref())
            .await?;
        let result = self
            .client
            .process(&text, action, &credential, &self.model)
            .await?;
        Ok(Some(result))
    }

    /// Export the last processed result.
    pub async fn export(&mut self, page: &Page) -> Result<PathBuf> {
        let result = self.last_result.clone().unwrap_or_default();
        self.export_text(page, &result).await
    }

    /// Export `result_text` together with the page's full extracted text.
    pub async fn export_text(&mut self, page: &Page, result_text: &str) -> Result<PathBuf> {
        self.board.clear();
        let _token = match self.gate.begin("export") {
            Ok(token) => token,
            Err(e) => return Err(self.fail("export", e)),
        };
        self.board.show_status("Creating markdown file...");

        match self.run_export(page, result_text).await {
            Ok(path) => {
                self.board.show_status("File saved successfully!");
                Ok(path)
            }
            Err(e) => Err(self.fail("export", e)),
        }
    }

    async fn run_export(&self, page: &Page, result_text: &str) -> Result<PathBuf> {
        if result_text.is_empty() {
            return Err(GleanError::NoResult);
        }
        let original_text = self.extractor.extract(page)?;
        let source = page.source_host();
        let date = today_utc();

        self.exporter
            .export(&ExportRequest {
                title: &page.title,
                source: &source,
                date: &date,
                original_text: &original_text,
                result_text,
            })
            .await
    }

    /// Log a failure and put it on the error line. The error is returned to
    /// the caller, which is the one that prints it.
    fn fail(&mut self, operation: &'static str, e: GleanError) -> GleanError {
        tracing::error!(operation, remote = e.is_remote(), error = %e, "operation.failed");
        self.board.record_error(e.to_string());
        e
    }
}
