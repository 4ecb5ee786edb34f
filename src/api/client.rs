//! HTTP client for the backend REST surface
//!
//! Wraps reqwest with the small set of endpoints the agent consumes:
//! liveness, auth, job listing, outcome reporting, and operator recovery.

use log::{debug, warn};
use parking_lot::RwLock;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use super::types::{AuthSession, HealthStatus, Job, JobReport};

/// Errors surfaced by the backend client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The stored token was rejected; the caller must re-authenticate.
    #[error("authentication expired or rejected")]
    AuthExpired,
    /// No token is stored for an endpoint that requires one.
    #[error("no authentication token available")]
    NotAuthenticated,
    /// The backend answered with an unexpected status.
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },
    /// Transport-level failure (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Seam between the poll loop and the backend
///
/// The production implementation is [`ApiClient`]; tests substitute a
/// scripted double to exercise single-flight and auth-halt behavior.
#[allow(async_fn_in_trait)]
pub trait JobBackend {
    /// Check whether the stored token is still accepted by the backend.
    ///
    /// `Ok(false)` means the backend explicitly rejected the token; any
    /// transport failure is an `Err` and leaves the auth state untouched.
    async fn validate_token(&self) -> Result<bool, ApiError>;

    /// Fetch up to `limit` pending jobs.
    async fn fetch_jobs(&self, limit: usize, deep_research_id: Option<&str>)
    -> Result<Vec<Job>, ApiError>;

    /// Post the outcome of a processed job.
    async fn report_outcome(&self, job_id: &str, report: &JobReport) -> Result<(), ApiError>;
}

/// Backend REST client
///
/// Thread-safe; the token cell is the only mutable state.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install a previously persisted token
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token.read().as_deref() {
            Some(token) => Ok(req.bearer_auth(token)),
            None => Err(ApiError::NotAuthenticated),
        }
    }

    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::AuthExpired);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http { status, body })
    }

    /// `GET /health` liveness probe
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.http.get(self.url("/health")).send().await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /signin`: authenticate and store the returned token
    pub async fn signin(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let response = self
            .http
            .post(self.url("/signin"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: AuthSession = Self::expect_ok(response).await?.json().await?;
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    /// `POST /signout`: best-effort server-side invalidation
    pub async fn signout(&self) -> Result<(), ApiError> {
        let req = self.authorized(self.http.post(self.url("/signout")))?;
        let response = req.send().await?;
        self.set_token(None);
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// `POST /crawl/jobs/:id/reset`: operator recovery for a stuck job
    pub async fn reset_job(&self, job_id: &str) -> Result<(), ApiError> {
        let req = self.authorized(
            self.http
                .post(self.url(&format!("/crawl/jobs/{job_id}/reset"))),
        )?;
        Self::expect_ok(req.send().await?).await?;
        Ok(())
    }

    /// `POST /crawl/jobs/reset-all`: reset every stuck job
    pub async fn reset_all_jobs(&self) -> Result<(), ApiError> {
        let req = self.authorized(self.http.post(self.url("/crawl/jobs/reset-all")))?;
        Self::expect_ok(req.send().await?).await?;
        Ok(())
    }
}

impl JobBackend for ApiClient {
    async fn validate_token(&self) -> Result<bool, ApiError> {
        let req = self.authorized(self.http.get(self.url("/me")))?;
        let response = req.send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Token validation rejected by backend");
                Ok(false)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Http { status, body })
            }
        }
    }

    async fn fetch_jobs(
        &self,
        limit: usize,
        deep_research_id: Option<&str>,
    ) -> Result<Vec<Job>, ApiError> {
        let mut req = self
            .authorized(self.http.get(self.url("/crawl/jobs")))?
            .query(&[("limit", limit.to_string())]);
        if let Some(id) = deep_research_id {
            req = req.query(&[("deepResearchId", id)]);
        }
        let response = Self::expect_ok(req.send().await?).await?;
        let jobs: Vec<Job> = response.json().await?;
        debug!("Fetched {} pending jobs", jobs.len());
        Ok(jobs)
    }

    async fn report_outcome(&self, job_id: &str, report: &JobReport) -> Result<(), ApiError> {
        let req = self
            .authorized(
                self.http
                    .post(self.url(&format!("/crawl/jobs/{job_id}/result"))),
            )?
            .json(report);
        Self::expect_ok(req.send().await?).await?;
        Ok(())
    }
}
