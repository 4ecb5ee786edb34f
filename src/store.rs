//! Persisted local agent state
//!
//! The native counterpart of the extension's key-value storage: auth
//! session, agent configuration, last-poll summary, crawl history, and the
//! diagnostic log ring, all in one JSON file that survives restarts.
//! Writes go through a temp file and rename so a crash mid-write never
//! leaves a truncated state file.

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::AuthSession;
use crate::config::AgentConfig;
use crate::diag::{CrawlRecord, LogEntry, PollSummary, RingBuffer};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedState {
    auth: Option<AuthSession>,
    config: AgentConfig,
    last_poll: Option<PollSummary>,
    history: RingBuffer<CrawlRecord>,
    log: RingBuffer<LogEntry>,
}

impl Default for PersistedState {
    fn default() -> Self {
        let config = AgentConfig::default();
        Self {
            auth: None,
            history: RingBuffer::new(config.history_cap()),
            log: RingBuffer::new(config.log_capacity()),
            last_poll: None,
            config,
        }
    }
}

/// On-disk agent state with in-memory access
///
/// Mutations are synchronous under a single lock; `persist()` flushes the
/// current state to disk and is called at cycle boundaries rather than on
/// every append.
#[derive(Debug)]
pub struct AgentStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl AgentStore {
    /// Default state-file location under the platform config directory
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("crawl-courier")
            .join("state.json")
    }

    /// Load state from `path`, falling back to defaults when absent
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed; a
    /// missing file is not an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut state: PersistedState = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt state file at {}", path.display()))?;
                // Ring capacities follow the loaded config, not whatever
                // the file was written with.
                let history_cap = state.config.history_cap();
                let log_cap = state.config.log_capacity();
                state.history.set_capacity(history_cap);
                state.log.set_capacity(log_cap);
                debug!("Loaded agent state from {}", path.display());
                state
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", path.display());
                PersistedState::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Write the current state to disk atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// write/rename fails.
    pub async fn persist(&self) -> Result<()> {
        let json = {
            let state = self.state.lock();
            serde_json::to_vec_pretty(&*state).context("Failed to serialize agent state")?
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to move state into {}", self.path.display()))?;
        Ok(())
    }

    /// Immutable configuration snapshot for one poll cycle
    #[must_use]
    pub fn config_snapshot(&self) -> AgentConfig {
        self.state.lock().config.clone()
    }

    /// Replace the configuration and re-cap the rings accordingly
    pub fn set_config(&self, config: AgentConfig) {
        let mut state = self.state.lock();
        state.history.set_capacity(config.history_cap());
        state.log.set_capacity(config.log_capacity());
        state.config = config;
    }

    #[must_use]
    pub fn auth(&self) -> Option<AuthSession> {
        self.state.lock().auth.clone()
    }

    pub fn set_auth(&self, session: AuthSession) {
        self.state.lock().auth = Some(session);
    }

    /// Drop the stored session, forcing re-authentication
    pub fn clear_auth(&self) {
        self.state.lock().auth = None;
    }

    pub fn record_poll(&self, summary: PollSummary) {
        self.state.lock().last_poll = Some(summary);
    }

    #[must_use]
    pub fn last_poll(&self) -> Option<PollSummary> {
        self.state.lock().last_poll.clone()
    }

    pub fn push_history(&self, record: CrawlRecord) {
        self.state.lock().history.push(record);
    }

    #[must_use]
    pub fn history(&self) -> Vec<CrawlRecord> {
        self.state.lock().history.snapshot()
    }

    pub fn append_log(&self, entry: LogEntry) {
        self.state.lock().log.push(entry);
    }

    #[must_use]
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.state.lock().log.snapshot()
    }
}
