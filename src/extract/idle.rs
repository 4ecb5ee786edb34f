//! DOM idle detection
//!
//! A page counts as idle once no mutation has been observed for the
//! configured quiet period. The wait always resolves: a hard deadline
//! bounds pathological pages (ads, tickers, long-polling widgets), and a
//! probe that cannot attach fails open rather than blocking extraction.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::Page;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

use super::js_scripts::{IDLE_PROBE_SCRIPT, MUTATION_OBSERVER_SCRIPT};

/// How an idle wait concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// No mutation for at least the quiet period.
    Quiet,
    /// The hard deadline elapsed while the page was still mutating.
    /// Degraded but valid; extraction proceeds with the current DOM.
    DeadlineReached,
    /// The mutation observer could not attach or stopped answering.
    /// Fails open: treated as immediately idle.
    ObserverUnavailable,
}

/// Source of DOM activity information
///
/// The production implementation is [`DomActivityProbe`] over CDP; tests
/// substitute a scripted probe to drive the temporal properties.
#[allow(async_fn_in_trait)]
pub trait ActivityProbe {
    /// Begin observing mutations. Failing here means there is nothing to
    /// observe (e.g. no document root).
    async fn install(&mut self) -> Result<()>;

    /// Time since the last observed mutation.
    async fn quiet_for(&mut self) -> Result<Duration>;
}

/// Bounded wait for DOM quiescence
#[derive(Debug, Clone, Copy)]
pub struct IdleWait {
    quiet_period: Duration,
    max_wait: Duration,
    poll_interval: Duration,
}

impl IdleWait {
    #[must_use]
    pub fn new(quiet_period: Duration, max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            quiet_period,
            max_wait,
            // A zero interval would spin the probe loop.
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Wait until the page is idle, the deadline passes, or the probe dies
    ///
    /// Never fails. Probe errors after a successful install are logged and
    /// collapse to `ObserverUnavailable` so a wedged page cannot stall the
    /// job pipeline.
    pub async fn run<P: ActivityProbe>(&self, probe: &mut P) -> IdleOutcome {
        let started = Instant::now();

        if let Err(e) = probe.install().await {
            warn!("Mutation observer unavailable, treating page as idle: {e:#}");
            return IdleOutcome::ObserverUnavailable;
        }

        loop {
            if started.elapsed() >= self.max_wait {
                debug!(
                    "Idle deadline reached after {:.1}s",
                    started.elapsed().as_secs_f64()
                );
                return IdleOutcome::DeadlineReached;
            }

            match probe.quiet_for().await {
                Ok(quiet) if quiet >= self.quiet_period => {
                    debug!(
                        "DOM idle after {:.1}s (quiet for {:.1}s)",
                        started.elapsed().as_secs_f64(),
                        quiet.as_secs_f64()
                    );
                    return IdleOutcome::Quiet;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Idle probe failed, treating page as idle: {e:#}");
                    return IdleOutcome::ObserverUnavailable;
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// CDP-backed activity probe over a live page
pub struct DomActivityProbe<'a> {
    page: &'a Page,
}

impl<'a> DomActivityProbe<'a> {
    #[must_use]
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }
}

impl ActivityProbe for DomActivityProbe<'_> {
    async fn install(&mut self) -> Result<()> {
        let result = self
            .page
            .evaluate(MUTATION_OBSERVER_SCRIPT)
            .await
            .context("Failed to install mutation observer")?;
        let value: serde_json::Value = result
            .into_value()
            .map_err(|e| anyhow!("Failed to read observer install result: {e}"))?;
        let attached = value
            .get("attached")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if attached {
            Ok(())
        } else {
            Err(anyhow!("No document root to observe"))
        }
    }

    async fn quiet_for(&mut self) -> Result<Duration> {
        let result = self
            .page
            .evaluate(IDLE_PROBE_SCRIPT)
            .await
            .context("Failed to probe mutation activity")?;
        let value: serde_json::Value = result
            .into_value()
            .map_err(|e| anyhow!("Failed to read idle probe result: {e}"))?;
        let millis = value
            .as_i64()
            .ok_or_else(|| anyhow!("Mutation observer state is gone"))?;
        Ok(Duration::from_millis(millis.max(0) as u64))
    }
}
