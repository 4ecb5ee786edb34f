//! Timer-driven job polling
//!
//! One poll cycle validates the stored token, fetches a bounded batch of
//! pending jobs, and hands them to the tab coordinator strictly one at a
//! time under a per-cycle budget. Cycles are single-flight: a timer tick
//! or manual trigger that arrives while a cycle is running is dropped,
//! never queued.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::coordinator::TabCoordinator;
use super::reporter::ResultReporter;
use super::tabs::TabOpener;
use crate::api::JobBackend;
use crate::diag::{LogEntry, LogLevel, LogSource, PollSummary};
use crate::store::AgentStore;

/// Out-of-band poll request, e.g. an operator's "poll now"
#[derive(Debug, Clone, Copy)]
pub struct PollNow;

pub struct JobPoller<B: JobBackend, O: TabOpener> {
    backend: Arc<B>,
    tabs: Arc<O>,
    store: Arc<AgentStore>,
    /// Single-flight guard; only the cycle that wins the swap runs.
    in_flight: AtomicBool,
    /// Set when the backend rejects our token; cleared by re-auth.
    halted: AtomicBool,
}

impl<B: JobBackend, O: TabOpener> JobPoller<B, O> {
    #[must_use]
    pub fn new(backend: Arc<B>, tabs: Arc<O>, store: Arc<AgentStore>) -> Self {
        Self {
            backend,
            tabs,
            store,
            in_flight: AtomicBool::new(false),
            halted: AtomicBool::new(false),
        }
    }

    /// Whether polling has been halted pending re-authentication
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Re-arm the poller after a fresh sign-in
    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
    }

    /// Run the poll loop until the trigger channel closes
    ///
    /// The timer honors `poll_enabled` and the halt flag; manual triggers
    /// bypass `poll_enabled` (an explicit operator action) but still skip
    /// when a cycle is already in flight. Triggers that arrive mid-cycle
    /// are dropped, not queued: each cycle already fetches a fresh batch.
    pub async fn run(&self, mut manual_rx: mpsc::Receiver<PollNow>) {
        loop {
            let config = self.store.config_snapshot();
            tokio::select! {
                () = tokio::time::sleep(config.poll_interval()) => {
                    if self.is_halted() {
                        debug!("Polling halted pending re-authentication, skipping tick");
                        continue;
                    }
                    if !config.poll_enabled() {
                        debug!("Polling disabled, skipping tick");
                        continue;
                    }
                    self.poll_once().await;
                    Self::drain_triggers(&mut manual_rx);
                }
                trigger = manual_rx.recv() => {
                    match trigger {
                        Some(PollNow) => {
                            info!("Manual poll requested");
                            self.poll_once().await;
                            Self::drain_triggers(&mut manual_rx);
                        }
                        None => {
                            debug!("Trigger channel closed, stopping poll loop");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Discard triggers that accumulated while the last cycle ran
    fn drain_triggers(manual_rx: &mut mpsc::Receiver<PollNow>) {
        let mut dropped = 0u32;
        while manual_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {dropped} poll triggers that arrived mid-cycle");
        }
    }

    /// Execute one poll cycle, unless one is already in flight
    ///
    /// Returns `None` when the cycle was skipped (overlap, auth halt, or
    /// connectivity failure before any job ran).
    pub async fn poll_once(&self) -> Option<PollSummary> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Poll cycle already in flight, dropping trigger");
            return None;
        }

        let summary = self.run_cycle().await;

        if let Some(summary) = &summary {
            self.store.record_poll(summary.clone());
        }
        if let Err(e) = self.store.persist().await {
            warn!("Failed to persist agent state: {e:#}");
        }

        self.in_flight.store(false, Ordering::SeqCst);
        summary
    }

    async fn run_cycle(&self) -> Option<PollSummary> {
        let config = self.store.config_snapshot();
        let started_at = Utc::now();
        let cycle_start = Instant::now();

        // Auth gate: an explicit rejection halts polling and clears the
        // stored session; transport failures are retried next tick.
        match self.backend.validate_token().await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Backend rejected stored token, halting polling until re-auth");
                self.store.clear_auth();
                self.halted.store(true, Ordering::SeqCst);
                self.store.append_log(LogEntry::new(
                    LogLevel::Error,
                    LogSource::Background,
                    "Session expired, sign in again to resume polling",
                ));
                return None;
            }
            Err(e) => {
                warn!("Token validation unreachable, will retry next cycle: {e}");
                self.store.append_log(LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Background,
                    format!("Backend unreachable: {e}"),
                ));
                return None;
            }
        }

        let jobs = match self
            .backend
            .fetch_jobs(config.job_batch_limit(), config.deep_research_id())
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Failed to fetch jobs: {e}");
                self.store.append_log(LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Background,
                    format!("Job fetch failed: {e}"),
                ));
                return None;
            }
        };

        let jobs_found = jobs.len();
        if jobs_found == 0 {
            debug!("No pending jobs");
            return Some(PollSummary {
                started_at,
                jobs_found: 0,
                jobs_processed: 0,
            });
        }
        info!("Found {jobs_found} pending jobs");

        let coordinator = TabCoordinator::new(&*self.tabs, &config, &self.store);
        let reporter = ResultReporter::new(&*self.backend, &self.store);
        let budget = config.cycle_budget();

        let mut jobs_processed = 0;
        for job in &jobs {
            if cycle_start.elapsed() >= budget {
                warn!(
                    "Cycle budget exhausted after {jobs_processed}/{jobs_found} jobs, \
                     leaving the rest for the next cycle"
                );
                break;
            }
            // Each job is isolated: process_job and report never fail, so
            // one bad page cannot stall the queue.
            let result = coordinator.process_job(job).await;
            reporter.report(job, &result).await;
            jobs_processed += 1;
        }

        Some(PollSummary {
            started_at,
            jobs_found,
            jobs_processed,
        })
    }
}
