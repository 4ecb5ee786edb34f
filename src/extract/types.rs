//! Result types for page extraction

use serde::{Deserialize, Serialize};

use super::idle::IdleOutcome;

/// Whether a capture produced usable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionOutcome {
    Ok,
    Error,
}

/// Raw capture of a single page, produced by `extract_page`
///
/// Always constructed, never an `Err`: serialization failures are carried
/// in `outcome`/`error_message` so the caller can still file a report.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub html: String,
    /// Visible text length, used by the redirect-detection heuristic.
    pub text_len: usize,
    pub size_bytes: usize,
    pub outcome: ExtractionOutcome,
    pub error_message: Option<String>,
    /// How the idle wait concluded for this capture.
    pub idle: IdleOutcome,
}

impl PageCapture {
    #[must_use]
    pub fn failed(message: impl Into<String>, idle: IdleOutcome) -> Self {
        Self {
            html: String::new(),
            text_len: 0,
            size_bytes: 0,
            outcome: ExtractionOutcome::Error,
            error_message: Some(message.into()),
            idle,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome == ExtractionOutcome::Ok
    }
}

/// Final per-job extraction result, consumed once by the reporter
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub job_id: String,
    pub url: String,
    pub html: String,
    pub size_bytes: usize,
    pub duration_ms: u64,
    pub outcome: ExtractionOutcome,
    pub error_message: Option<String>,
}

impl ExtractionResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome == ExtractionOutcome::Ok
    }

    /// Build a failure result for a job that never produced a capture
    #[must_use]
    pub fn failure(
        job_id: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            url: url.into(),
            html: String::new(),
            size_bytes: 0,
            duration_ms,
            outcome: ExtractionOutcome::Error,
            error_message: Some(message.into()),
        }
    }
}
