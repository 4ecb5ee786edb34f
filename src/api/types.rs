//! Wire types for the backend REST surface
//!
//! Field names follow the backend's camelCase JSON convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a crawl job, owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Claimed,
    Done,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::Done => write!(f, "DONE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One unit of crawl work handed out by the backend
///
/// The agent holds a transient copy while processing; the claim is a local
/// state transition only, confirmed by the backend when the outcome is
/// reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome report posted back when a job finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub size_bytes: usize,
    pub duration_ms: u64,
}

/// Authenticated session returned by `POST /signin`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Response of the `GET /health` liveness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_deserializes_from_backend_shape() {
        let json = r#"{
            "id": "42",
            "url": "https://example.com/article",
            "title": "An article",
            "status": "PENDING",
            "attempts": 2,
            "createdAt": "2026-01-15T10:30:00Z"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "42");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 2);
        assert!(job.completed_at.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn report_omits_absent_fields() {
        let report = JobReport {
            status: JobStatus::Failed,
            html: None,
            error: Some("extraction timed out".into()),
            size_bytes: 0,
            duration_ms: 30_000,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("html"));
        assert!(json.contains("\"status\":\"FAILED\""));
        assert!(json.contains("sizeBytes"));
    }
}
