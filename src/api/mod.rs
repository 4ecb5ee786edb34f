//! Backend REST client
//!
//! Wire types and the reqwest-backed client for the job backend, plus the
//! `JobBackend` trait the poller is written against.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, JobBackend};
pub use types::{AuthSession, HealthStatus, Job, JobReport, JobStatus};
