//! Core configuration types for the extraction agent
//!
//! This module contains the main `AgentConfig` struct that defines every
//! tunable for polling, extraction, and reporting. A config value is an
//! immutable snapshot: the poller reads a fresh copy from the store between
//! cycles instead of consulting ambient mutable state.

use serde::{Deserialize, Serialize};

/// Main configuration struct for the extraction agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the backend the agent polls for jobs.
    pub(crate) server_base_url: String,

    /// Whether the timer-driven poll loop is active.
    ///
    /// Manual "poll now" triggers ignore this flag; it gates the timer only.
    pub(crate) poll_enabled: bool,

    /// Seconds between poll cycles
    ///
    /// Default: 30 seconds
    pub(crate) poll_interval_secs: Option<u64>,

    /// Maximum number of jobs fetched per cycle
    ///
    /// Default: 10
    pub(crate) job_batch_limit: Option<usize>,

    /// Optional deep-research run to restrict job fetches to
    pub(crate) deep_research_id: Option<String>,

    /// Total time budget for one poll cycle in seconds
    ///
    /// Jobs still queued when the budget runs out are left for the next
    /// cycle; the backend will hand them out again.
    ///
    /// Default: 300 seconds
    pub(crate) cycle_budget_secs: Option<u64>,

    /// Timeout in seconds for the document ready-state wait
    ///
    /// Default: 30 seconds
    pub(crate) page_load_timeout_secs: Option<u64>,

    /// Quiet period for the DOM idle detector in milliseconds
    ///
    /// The page is considered settled once no mutation has been observed
    /// for this long.
    ///
    /// Default: 5000 ms
    pub(crate) idle_quiet_ms: Option<u64>,

    /// Hard ceiling for the DOM idle wait in milliseconds
    ///
    /// Reaching the ceiling is a degraded-but-valid completion, not an
    /// error; extraction proceeds with whatever the page has rendered.
    ///
    /// Default: 120000 ms
    pub(crate) idle_max_wait_ms: Option<u64>,

    /// Granularity of the idle detector's probe loop in milliseconds
    ///
    /// Default: 250 ms
    pub(crate) idle_poll_interval_ms: Option<u64>,

    /// Overall per-job extraction timeout in seconds
    ///
    /// Bounds everything between tab open and tab close. The tab is
    /// force-closed when the budget expires regardless of progress.
    ///
    /// Default: 180 seconds
    pub(crate) extraction_timeout_secs: Option<u64>,

    /// Attempts to reach a freshly opened tab before giving up
    ///
    /// Default: 3
    pub(crate) tab_ready_attempts: Option<u32>,

    /// Base backoff between tab-ready attempts in milliseconds
    ///
    /// Default: 500 ms
    pub(crate) tab_ready_backoff_ms: Option<u64>,

    /// Enable the short-content redirect heuristic
    ///
    /// When a capture's text length falls below `redirect_min_text_len`,
    /// the page is assumed to be a client-side redirect or interstitial and
    /// is re-extracted once after an extra wait.
    pub(crate) redirect_detection_enabled: bool,

    /// Text length below which a capture is treated as a redirect page
    ///
    /// Default: 3000 characters
    pub(crate) redirect_min_text_len: Option<usize>,

    /// Extra wait before the redirect re-extraction in seconds
    ///
    /// Default: 10 seconds
    pub(crate) redirect_extra_wait_secs: Option<u64>,

    /// Cap on the locally retained crawl history
    ///
    /// Default: 100 records
    pub(crate) history_cap: Option<usize>,

    /// Capacity of the diagnostic log ring
    ///
    /// Default: 500 entries
    pub(crate) log_capacity: Option<usize>,

    /// Run the browser headless
    pub(crate) headless: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_base_url: String::new(),
            poll_enabled: true,
            poll_interval_secs: Some(30),
            job_batch_limit: Some(10),
            deep_research_id: None,
            cycle_budget_secs: Some(300),
            page_load_timeout_secs: Some(30),
            idle_quiet_ms: Some(5_000),
            idle_max_wait_ms: Some(120_000),
            idle_poll_interval_ms: Some(250),
            extraction_timeout_secs: Some(180),
            tab_ready_attempts: Some(3),
            tab_ready_backoff_ms: Some(500),
            redirect_detection_enabled: false,
            redirect_min_text_len: Some(3_000),
            redirect_extra_wait_secs: Some(10),
            history_cap: Some(100),
            log_capacity: Some(500),
            headless: true,
        }
    }
}
