//! Per-job tab coordination
//!
//! Owns the full lifecycle of one claimed job: open a tab, wait for it to
//! answer, run the extraction under an overall time budget, optionally
//! re-extract when the redirect heuristic fires, and close the tab on
//! every exit path.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

use super::tabs::{TabOpener, TabSession};
use super::timeout::with_timeout;
use crate::api::Job;
use crate::config::AgentConfig;
use crate::diag::{LogEntry, LogLevel, LogSource};
use crate::extract::{ExtractOptions, ExtractionResult, IdleOutcome, PageCapture};
use crate::store::AgentStore;

const TAB_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives extraction for a single job at a time
///
/// Serial by construction: a coordinator is used by one poll cycle and the
/// cycle processes jobs one after another, so at most one tab is ever
/// open.
pub struct TabCoordinator<'a, O: TabOpener> {
    tabs: &'a O,
    config: &'a AgentConfig,
    store: &'a AgentStore,
}

impl<'a, O: TabOpener> TabCoordinator<'a, O> {
    #[must_use]
    pub fn new(tabs: &'a O, config: &'a AgentConfig, store: &'a AgentStore) -> Self {
        Self {
            tabs,
            config,
            store,
        }
    }

    /// Process one claimed job, always producing a reportable result
    ///
    /// Never fails: tab-open errors, messaging failures, and budget
    /// expiry all collapse into an error-outcome result. The tab, once
    /// open, is closed exactly once regardless of how extraction ends.
    pub async fn process_job(&self, job: &Job) -> ExtractionResult {
        let started = Instant::now();
        info!("Processing job {} ({})", job.id, job.url);

        let mut session = match self.tabs.open(&job.url).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to open tab for {}: {e:#}", job.url);
                return self.failure(job, format!("Failed to open tab: {e:#}"), started);
            }
        };

        let budget = self.config.extraction_timeout();
        let outcome = with_timeout(self.drive(&mut session, &job.url), budget, "Extraction").await;

        // Scoped resource release: the tab closes here on success, error,
        // and timeout alike. The close gets its own bound so a wedged CDP
        // connection cannot stall the cycle.
        if let Err(e) = with_timeout(session.close(), TAB_CLOSE_TIMEOUT, "Tab close").await {
            warn!("Failed to close tab for {}: {e:#}", job.url);
        }

        match outcome {
            Ok(capture) => self.finish(job, capture, started),
            Err(e) => {
                warn!("Extraction failed for {}: {e:#}", job.url);
                self.failure(job, format!("{e:#}"), started)
            }
        }
    }

    /// Ready-wait, capture, and the single redirect re-extraction
    async fn drive(&self, session: &mut O::Session, url: &str) -> Result<PageCapture> {
        self.await_ready(session, url).await?;

        let opts = ExtractOptions::from_config(self.config);
        let mut capture = session
            .extract(&opts)
            .await
            .context("No response from tab")?;

        if self.should_reextract(&capture) {
            info!(
                "Short content ({} chars < {}) for {url}, suspecting client-side redirect",
                capture.text_len,
                self.config.redirect_min_text_len()
            );
            self.store.append_log(
                LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Foreground,
                    "Short content, waiting for client-side redirect to settle",
                )
                .with_url(url),
            );
            tokio::time::sleep(self.config.redirect_extra_wait()).await;
            // One extra attempt only; a persistently short page is
            // accepted as-is.
            capture = session
                .extract(&opts)
                .await
                .context("No response from tab on re-extraction")?;
        }

        Ok(capture)
    }

    fn should_reextract(&self, capture: &PageCapture) -> bool {
        self.config.redirect_detection_enabled()
            && capture.is_ok()
            && capture.text_len < self.config.redirect_min_text_len()
    }

    /// Probe the tab until it answers, with bounded exponential backoff
    async fn await_ready(&self, session: &mut O::Session, url: &str) -> Result<()> {
        let attempts = self.config.tab_ready_attempts();
        let base = u64::try_from(self.config.tab_ready_backoff().as_millis()).unwrap_or(500);

        let mut attempt = 0u32;
        loop {
            match session.probe_ready().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(e).with_context(|| {
                            format!("Tab for {url} not ready after {attempts} attempts")
                        });
                    }
                    let jitter = rand::rng().random_range(0..200);
                    // Cap the exponent so large attempt counts cannot
                    // overflow the backoff arithmetic.
                    let shift = (attempt - 1).min(10);
                    let delay = base.saturating_mul(1u64 << shift) + jitter;
                    debug!("Tab for {url} not ready (attempt {attempt}), retrying in {delay}ms");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    fn finish(&self, job: &Job, capture: PageCapture, started: Instant) -> ExtractionResult {
        if capture.idle == IdleOutcome::DeadlineReached {
            self.store.append_log(
                LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Foreground,
                    "Page never went quiet, captured at the idle ceiling",
                )
                .with_url(&job.url),
            );
        }

        ExtractionResult {
            job_id: job.id.clone(),
            url: job.url.clone(),
            size_bytes: capture.size_bytes,
            html: capture.html,
            duration_ms: duration_ms(started),
            outcome: capture.outcome,
            error_message: capture.error_message,
        }
    }

    fn failure(&self, job: &Job, message: String, started: Instant) -> ExtractionResult {
        self.store.append_log(
            LogEntry::new(LogLevel::Error, LogSource::Foreground, message.clone())
                .with_url(&job.url),
        );
        ExtractionResult::failure(&job.id, &job.url, message, duration_ms(started))
    }
}

fn duration_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
