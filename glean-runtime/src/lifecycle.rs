//! One user-visible operation at a time.
//!
//! [`OperationGate::begin`] hands out an [`OperationToken`]; while it is alive
//! every other `begin` fails with [`GleanError::Busy`]. The gate reopens when
//! the token is passed to [`OperationGate::end`] or simply dropped, so an
//! early return or `?` cannot leave the controls disabled.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glean_common::{GleanError, Result};

#[derive(Clone, Default)]
pub struct OperationGate {
    busy: Arc<AtomicBool>,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, label: &'static str) -> Result<OperationToken> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GleanError::Busy(label.to_string()))?;
        tracing::debug!(operation = label, "operation.begin");
        Ok(OperationToken {
            busy: self.busy.clone(),
            label,
            started: Instant::now(),
        })
    }

    /// Explicit release; equivalent to dropping the token.
    pub fn end(&self, token: OperationToken) {
        drop(token);
    }

    /// True while a token is outstanding (the "buttons disabled" state).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[must_use = "the operation ends as soon as the token is dropped"]
pub struct OperationToken {
    busy: Arc<AtomicBool>,
    label: &'static str,
    started: Instant,
}

impl Drop for OperationToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        tracing::debug!(
            operation = self.label,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "operation.end"
        );
    }
}

/// The status line and error line shown to the user.
#[derive(Default)]
pub struct StatusBoard {
    status: String,
    error: Option<String>,
    echo: Option<Box<dyn Write + Send>>,
}

impl StatusBoard {
    /// A board that also prints updates to stderr.
    pub fn echoing() -> Self {
        Self::echoing_to(std::io::stderr())
    }

    pub fn echoing_to(out: impl Write + Send + 'static) -> Self {
        Self {
            echo: Some(Box::new(out)),
            ..Self::default()
        }
    }

    pub fn show_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        tracing::info!(status = %self.status, "status");
        if let Some(out) = self.echo.as_mut() {
            let _ = writeln!(out, "{}", self.status);
        }
    }

    /// Show a message on the error line that the caller does not report
    /// anywhere else.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(out) = self.echo.as_mut() {
            let _ = writeln!(out, "error: {message}");
        }
        self.record_error(message);
    }

    /// Set the error line without echoing it; for errors that are also
    /// returned and printed by the caller.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "status.error");
        self.error = Some(message);
    }

    /// Blank the status line and hide the error line.
    pub fn clear(&mut self) {
        self.status.clear();
        self.error = None;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
