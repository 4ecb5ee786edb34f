//! Type-safe builder for `AgentConfig` using the typestate pattern
//!
//! The builder refuses to produce a config until the backend server URL has
//! been provided; everything else has a sensible default.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use url::Url;

use super::types::AgentConfig;

/// Marker state: the server URL has been set and the config can be built.
pub struct WithServerUrl;

pub struct AgentConfigBuilder<State = ()> {
    pub(crate) inner: AgentConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for AgentConfigBuilder<()> {
    fn default() -> Self {
        Self {
            inner: AgentConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl AgentConfigBuilder<()> {
    /// Set the backend base URL, unlocking `build()`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or carries a scheme other
    /// than http/https.
    pub fn server_base_url(
        self,
        url: impl Into<String>,
    ) -> Result<AgentConfigBuilder<WithServerUrl>> {
        let raw = url.into();
        let parsed = Url::parse(&raw).map_err(|e| anyhow!("Invalid server URL '{raw}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Unsupported scheme '{}' in server URL",
                parsed.scheme()
            ));
        }
        let mut inner = self.inner;
        inner.server_base_url = raw.trim_end_matches('/').to_string();
        Ok(AgentConfigBuilder {
            inner,
            _phantom: PhantomData,
        })
    }
}

impl<State> AgentConfigBuilder<State> {
    #[must_use]
    pub fn poll_enabled(mut self, enabled: bool) -> Self {
        self.inner.poll_enabled = enabled;
        self
    }

    #[must_use]
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.inner.poll_interval_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn job_batch_limit(mut self, limit: usize) -> Self {
        self.inner.job_batch_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn deep_research_id(mut self, id: impl Into<String>) -> Self {
        self.inner.deep_research_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn cycle_budget_secs(mut self, secs: u64) -> Self {
        self.inner.cycle_budget_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.inner.page_load_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn idle_quiet_ms(mut self, ms: u64) -> Self {
        self.inner.idle_quiet_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn idle_max_wait_ms(mut self, ms: u64) -> Self {
        self.inner.idle_max_wait_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn idle_poll_interval_ms(mut self, ms: u64) -> Self {
        self.inner.idle_poll_interval_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn extraction_timeout_secs(mut self, secs: u64) -> Self {
        self.inner.extraction_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn tab_ready_attempts(mut self, attempts: u32) -> Self {
        self.inner.tab_ready_attempts = Some(attempts.max(1));
        self
    }

    #[must_use]
    pub fn tab_ready_backoff_ms(mut self, ms: u64) -> Self {
        self.inner.tab_ready_backoff_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn redirect_detection(mut self, enabled: bool) -> Self {
        self.inner.redirect_detection_enabled = enabled;
        self
    }

    #[must_use]
    pub fn redirect_min_text_len(mut self, len: usize) -> Self {
        self.inner.redirect_min_text_len = Some(len);
        self
    }

    #[must_use]
    pub fn redirect_extra_wait_secs(mut self, secs: u64) -> Self {
        self.inner.redirect_extra_wait_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn history_cap(mut self, cap: usize) -> Self {
        self.inner.history_cap = Some(cap);
        self
    }

    #[must_use]
    pub fn log_capacity(mut self, cap: usize) -> Self {
        self.inner.log_capacity = Some(cap);
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.inner.headless = headless;
        self
    }
}

impl AgentConfigBuilder<WithServerUrl> {
    /// Finalize the configuration
    #[must_use]
    pub fn build(self) -> AgentConfig {
        self.inner
    }
}
