//! Full-page capture
//!
//! Waits for the document to finish loading, for the DOM to go quiet, then
//! serializes the page. Every step is bounded by its own timeout and every
//! failure is captured in the returned `PageCapture`; this function never
//! returns an error so the caller can always file a report.

use chromiumoxide::Page;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

use super::idle::{DomActivityProbe, IdleOutcome, IdleWait};
use super::js_scripts::{READY_STATE_SCRIPT, SERIALIZE_DOCUMENT_SCRIPT};
use super::types::{ExtractionOutcome, PageCapture};
use crate::config::AgentConfig;

/// Timeouts governing one capture
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub load_timeout: Duration,
    pub quiet_period: Duration,
    pub idle_max_wait: Duration,
    pub idle_poll_interval: Duration,
}

impl ExtractOptions {
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            load_timeout: config.page_load_timeout(),
            quiet_period: config.idle_quiet_period(),
            idle_max_wait: config.idle_max_wait(),
            idle_poll_interval: config.idle_poll_interval(),
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(30),
            quiet_period: Duration::from_secs(5),
            idle_max_wait: Duration::from_secs(120),
            idle_poll_interval: Duration::from_millis(250),
        }
    }
}

/// Capture a loaded page's serialized DOM
///
/// Steps, each an independent early-exit point:
/// 1. Poll until `document.readyState === 'complete'`, bounded by the load
///    timeout (already-complete pages proceed immediately).
/// 2. Wait for DOM idleness (quiet period vs hard ceiling).
/// 3. Serialize the document and measure its byte size.
pub async fn extract_page(page: &Page, opts: &ExtractOptions) -> PageCapture {
    wait_for_document_complete(page, opts.load_timeout).await;

    let idle = IdleWait::new(opts.quiet_period, opts.idle_max_wait, opts.idle_poll_interval)
        .run(&mut DomActivityProbe::new(page))
        .await;

    serialize_document(page, idle).await
}

/// Poll the page until the document reports `complete`
///
/// `page.wait_for_navigation()` only covers the HTTP response; JS-heavy
/// pages need the readyState poll before their content exists. A timeout
/// here is logged and tolerated since the idle wait still follows.
async fn wait_for_document_complete(page: &Page, max_wait: Duration) {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= max_wait {
            warn!(
                "Timeout waiting for page load after {:.0}s, proceeding anyway",
                max_wait.as_secs_f64()
            );
            return;
        }

        match page.evaluate(READY_STATE_SCRIPT).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let ready_state = value.get("readyState").and_then(|v| v.as_str());
                    if ready_state == Some("complete") {
                        debug!("Page ready after {:.2}s", start.elapsed().as_secs_f64());
                        return;
                    }
                }
            }
            Err(e) => {
                debug!("Failed to check readyState: {e}, retrying");
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

async fn serialize_document(page: &Page, idle: IdleOutcome) -> PageCapture {
    let evaluated = match page.evaluate(SERIALIZE_DOCUMENT_SCRIPT).await {
        Ok(result) => result,
        Err(e) => return PageCapture::failed(format!("Serialization request failed: {e}"), idle),
    };

    match evaluated.into_value() {
        Ok(value) => capture_from_serialized(&value, idle),
        Err(e) => PageCapture::failed(format!("Serialization returned no value: {e}"), idle),
    }
}

/// Map the serializer script's `{ok, html, textLen, error}` reply to a capture
fn capture_from_serialized(value: &serde_json::Value, idle: IdleOutcome) -> PageCapture {
    let ok = value
        .get("ok")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    if !ok {
        let message = value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown serialization error");
        return PageCapture::failed(format!("Serialization failed: {message}"), idle);
    }

    let html = value
        .get("html")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let text_len = value
        .get("textLen")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as usize;

    PageCapture {
        size_bytes: html.len(),
        text_len,
        html,
        outcome: ExtractionOutcome::Ok,
        error_message: None,
        idle,
    }
}
