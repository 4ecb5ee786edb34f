//! Temporal properties of the DOM idle wait
//!
//! Runs against a scripted activity probe on a paused tokio clock, so the
//! quiet-period and deadline timings are exact.

use anyhow::{Result, anyhow};
use std::time::Duration;
use tokio::time::Instant;

use crawl_courier::extract::{ActivityProbe, IdleOutcome, IdleWait};

/// Probe whose "last mutation" times are scripted relative to install
struct ScriptedProbe {
    installed_at: Option<Instant>,
    /// Offsets (from install) at which a mutation is considered to have
    /// occurred. Must be sorted ascending.
    mutation_offsets: Vec<Duration>,
    fail_install: bool,
    fail_probe: bool,
}

impl ScriptedProbe {
    fn quiet(offsets: Vec<Duration>) -> Self {
        Self {
            installed_at: None,
            mutation_offsets: offsets,
            fail_install: false,
            fail_probe: false,
        }
    }
}

impl ActivityProbe for ScriptedProbe {
    async fn install(&mut self) -> Result<()> {
        if self.fail_install {
            return Err(anyhow!("no document root"));
        }
        self.installed_at = Some(Instant::now());
        Ok(())
    }

    async fn quiet_for(&mut self) -> Result<Duration> {
        if self.fail_probe {
            return Err(anyhow!("observer state gone"));
        }
        let installed_at = self.installed_at.expect("probe not installed");
        let elapsed = installed_at.elapsed();
        let last_mutation = self
            .mutation_offsets
            .iter()
            .copied()
            .take_while(|offset| *offset <= elapsed)
            .last()
            .unwrap_or(Duration::ZERO);
        Ok(elapsed - last_mutation)
    }
}

#[tokio::test(start_paused = true)]
async fn resolves_at_quiet_period_when_nothing_mutates() {
    let wait = IdleWait::new(
        Duration::from_secs(5),
        Duration::from_secs(120),
        Duration::from_millis(250),
    );
    let mut probe = ScriptedProbe::quiet(vec![]);

    let started = Instant::now();
    let outcome = wait.run(&mut probe).await;

    assert_eq!(outcome, IdleOutcome::Quiet);
    let elapsed = started.elapsed();
    // ~Q, not M: one poll interval of slack.
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_millis(5_500), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn deadline_dominates_when_quiet_period_exceeds_it() {
    let wait = IdleWait::new(
        Duration::from_secs(60),
        Duration::from_secs(10),
        Duration::from_millis(250),
    );
    let mut probe = ScriptedProbe::quiet(vec![]);

    let started = Instant::now();
    let outcome = wait.run(&mut probe).await;

    assert_eq!(outcome, IdleOutcome::DeadlineReached);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_millis(10_500), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn mutations_push_the_quiet_point_out() {
    let wait = IdleWait::new(
        Duration::from_secs(5),
        Duration::from_secs(120),
        Duration::from_millis(250),
    );
    // A burst of mutations ending at t=3s; idle should land near 3s + 5s.
    let mut probe = ScriptedProbe::quiet(vec![
        Duration::from_secs(1),
        Duration::from_secs(2),
        Duration::from_secs(3),
    ]);

    let started = Instant::now();
    let outcome = wait.run(&mut probe).await;

    assert_eq!(outcome, IdleOutcome::Quiet);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(8));
    assert!(elapsed < Duration::from_millis(8_500), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn busy_page_hits_the_deadline() {
    let wait = IdleWait::new(
        Duration::from_secs(5),
        Duration::from_secs(20),
        Duration::from_millis(250),
    );
    // A mutation every second, forever (well past the deadline).
    let offsets = (1..60).map(Duration::from_secs).collect();
    let mut probe = ScriptedProbe::quiet(offsets);

    let started = Instant::now();
    let outcome = wait.run(&mut probe).await;

    assert_eq!(outcome, IdleOutcome::DeadlineReached);
    assert!(started.elapsed() >= Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn install_failure_fails_open_immediately() {
    let wait = IdleWait::new(
        Duration::from_secs(5),
        Duration::from_secs(120),
        Duration::from_millis(250),
    );
    let mut probe = ScriptedProbe::quiet(vec![]);
    probe.fail_install = true;

    let started = Instant::now();
    let outcome = wait.run(&mut probe).await;

    assert_eq!(outcome, IdleOutcome::ObserverUnavailable);
    assert!(started.elapsed() < Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn probe_failure_fails_open() {
    let wait = IdleWait::new(
        Duration::from_secs(5),
        Duration::from_secs(120),
        Duration::from_millis(250),
    );
    let mut probe = ScriptedProbe::quiet(vec![]);
    probe.fail_probe = true;

    let outcome = wait.run(&mut probe).await;
    assert_eq!(outcome, IdleOutcome::ObserverUnavailable);
}
