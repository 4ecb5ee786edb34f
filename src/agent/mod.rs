//! Job-processing agent
//!
//! The poll loop and everything it drives: tab coordination, extraction
//! timeouts, and result reporting.

pub mod coordinator;
pub mod poller;
pub mod reporter;
pub mod tabs;
pub mod timeout;

pub use coordinator::TabCoordinator;
pub use poller::{JobPoller, PollNow};
pub use reporter::ResultReporter;
pub use tabs::{BrowserTab, BrowserTabs, TabOpener, TabSession};
pub use timeout::with_timeout;
