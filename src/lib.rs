//! crawl_courier: headless-browser extraction agent
//!
//! Polls a backend for crawl jobs, opens each job's URL in a Chromium tab,
//! waits for the DOM to settle, serializes the document, and reports the
//! outcome back. Strictly serial: one poll cycle at a time, one open tab
//! at a time.

pub mod agent;
pub mod api;
pub mod browser;
pub mod config;
pub mod diag;
pub mod extract;
pub mod store;

pub use agent::{BrowserTabs, JobPoller, PollNow, TabCoordinator, TabOpener, TabSession};
pub use api::{ApiClient, ApiError, Job, JobBackend, JobReport, JobStatus};
pub use browser::{launch_browser, shutdown_browser};
pub use config::AgentConfig;
pub use diag::{CrawlRecord, LogEntry, LogLevel, LogSource, PollSummary, RingBuffer};
pub use extract::{ExtractOptions, ExtractionOutcome, ExtractionResult, IdleOutcome, IdleWait};
pub use store::AgentStore;
