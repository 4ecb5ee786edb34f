//! Bounded diagnostics
//!
//! Ring-buffered log entries and crawl history for operator display.

pub mod ring;
pub mod types;

pub use ring::RingBuffer;
pub use types::{CrawlRecord, LogEntry, LogLevel, LogSource, PollSummary};
