//! Default-applying accessors for `AgentConfig`
//!
//! Optional tunables are stored as `Option` so a persisted config written
//! by an older version deserializes cleanly; the getters paper over the
//! holes with the documented defaults.

use std::time::Duration;

use super::types::AgentConfig;

impl AgentConfig {
    #[must_use]
    pub fn builder() -> super::builder::AgentConfigBuilder<()> {
        super::builder::AgentConfigBuilder::default()
    }

    #[must_use]
    pub fn server_base_url(&self) -> &str {
        &self.server_base_url
    }

    /// Replace the backend URL, keeping every other tunable
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or has a non-HTTP scheme.
    pub fn with_server_base_url(mut self, url: impl Into<String>) -> anyhow::Result<Self> {
        let validated = Self::builder().server_base_url(url)?.build();
        self.server_base_url = validated.server_base_url;
        Ok(self)
    }

    #[must_use]
    pub fn poll_enabled(&self) -> bool {
        self.poll_enabled
    }

    #[must_use]
    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs.unwrap_or(30)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs())
    }

    #[must_use]
    pub fn job_batch_limit(&self) -> usize {
        self.job_batch_limit.unwrap_or(10)
    }

    #[must_use]
    pub fn deep_research_id(&self) -> Option<&str> {
        self.deep_research_id.as_deref()
    }

    #[must_use]
    pub fn cycle_budget(&self) -> Duration {
        Duration::from_secs(self.cycle_budget_secs.unwrap_or(300))
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs.unwrap_or(30))
    }

    #[must_use]
    pub fn idle_quiet_ms(&self) -> u64 {
        self.idle_quiet_ms.unwrap_or(5_000)
    }

    #[must_use]
    pub fn idle_quiet_period(&self) -> Duration {
        Duration::from_millis(self.idle_quiet_ms())
    }

    #[must_use]
    pub fn idle_max_wait(&self) -> Duration {
        Duration::from_millis(self.idle_max_wait_ms.unwrap_or(120_000))
    }

    #[must_use]
    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms.unwrap_or(250))
    }

    #[must_use]
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs.unwrap_or(180))
    }

    #[must_use]
    pub fn tab_ready_attempts(&self) -> u32 {
        self.tab_ready_attempts.unwrap_or(3).max(1)
    }

    #[must_use]
    pub fn tab_ready_backoff(&self) -> Duration {
        Duration::from_millis(self.tab_ready_backoff_ms.unwrap_or(500))
    }

    #[must_use]
    pub fn redirect_detection_enabled(&self) -> bool {
        self.redirect_detection_enabled
    }

    #[must_use]
    pub fn redirect_min_text_len(&self) -> usize {
        self.redirect_min_text_len.unwrap_or(3_000)
    }

    #[must_use]
    pub fn redirect_extra_wait(&self) -> Duration {
        Duration::from_secs(self.redirect_extra_wait_secs.unwrap_or(10))
    }

    #[must_use]
    pub fn history_cap(&self) -> usize {
        self.history_cap.unwrap_or(100)
    }

    #[must_use]
    pub fn log_capacity(&self) -> usize {
        self.log_capacity.unwrap_or(500)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }
}
