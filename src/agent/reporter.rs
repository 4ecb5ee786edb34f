//! Result reporting
//!
//! Posts each job's outcome to the backend and records it in the local
//! history. Reporting is best-effort: a failed POST is logged and
//! swallowed, and the backend's own reclaim logic owns convergence for
//! jobs it never hears back about.

use chrono::Utc;
use log::{debug, warn};

use crate::api::{Job, JobBackend, JobReport, JobStatus};
use crate::diag::{CrawlRecord, LogEntry, LogLevel, LogSource};
use crate::extract::ExtractionResult;
use crate::store::AgentStore;

pub struct ResultReporter<'a, B: JobBackend> {
    backend: &'a B,
    store: &'a AgentStore,
}

impl<'a, B: JobBackend> ResultReporter<'a, B> {
    #[must_use]
    pub fn new(backend: &'a B, store: &'a AgentStore) -> Self {
        Self { backend, store }
    }

    /// Report one completed job
    ///
    /// Never fails and never retries; local history is appended regardless
    /// of whether the backend acknowledged the outcome.
    pub async fn report(&self, job: &Job, result: &ExtractionResult) {
        let report = JobReport {
            status: if result.is_ok() {
                JobStatus::Done
            } else {
                JobStatus::Failed
            },
            html: if result.is_ok() {
                Some(result.html.clone())
            } else {
                None
            },
            error: result.error_message.clone(),
            size_bytes: result.size_bytes,
            duration_ms: result.duration_ms,
        };

        match self.backend.report_outcome(&job.id, &report).await {
            Ok(()) => debug!("Reported job {} as {}", job.id, report.status),
            Err(e) => {
                // The backend will hand the job out again once its claim
                // expires; local completion stands.
                warn!("Failed to report job {}: {e}", job.id);
                self.store.append_log(
                    LogEntry::new(
                        LogLevel::Warn,
                        LogSource::Background,
                        format!("Failed to report job {}: {e}", job.id),
                    )
                    .with_url(&job.url),
                );
            }
        }

        self.store.push_history(CrawlRecord {
            job_id: job.id.clone(),
            url: job.url.clone(),
            succeeded: result.is_ok(),
            size_bytes: result.size_bytes,
            duration_ms: result.duration_ms,
            finished_at: Utc::now(),
            error: result.error_message.clone(),
        });

        let (level, message) = if result.is_ok() {
            (
                LogLevel::Success,
                format!(
                    "Extracted {} bytes in {}ms",
                    result.size_bytes, result.duration_ms
                ),
            )
        } else {
            (
                LogLevel::Error,
                format!(
                    "Extraction failed: {}",
                    result.error_message.as_deref().unwrap_or("unknown error")
                ),
            )
        };
        self.store
            .append_log(LogEntry::new(level, LogSource::Background, message).with_url(&job.url));
    }
}
