//! Tab abstraction
//!
//! The coordinator talks to pages through a narrow request/response seam:
//! open a tab, probe it, request a capture, close it. The production
//! implementation rides on chromiumoxide; tests substitute counting
//! doubles to verify resource discipline.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use log::{debug, warn};
use std::sync::Arc;

use crate::extract::{ExtractOptions, PageCapture, extract_page};

/// One open tab holding a navigated page
#[allow(async_fn_in_trait)]
pub trait TabSession {
    /// Single readiness probe; the coordinator owns the retry loop.
    async fn probe_ready(&mut self) -> Result<()>;

    /// Request a capture of the current page.
    ///
    /// An `Err` is a transport failure (no response, tab gone); content
    /// problems are reported inside the returned `PageCapture`.
    async fn extract(&mut self, opts: &ExtractOptions) -> Result<PageCapture>;

    /// Close the tab. Must be idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// Factory for tab sessions
#[allow(async_fn_in_trait)]
pub trait TabOpener {
    type Session: TabSession;

    /// Open a tab and start navigating it to `url`.
    async fn open(&self, url: &str) -> Result<Self::Session>;
}

/// Chromiumoxide-backed tab factory
pub struct BrowserTabs {
    browser: Arc<Browser>,
}

impl BrowserTabs {
    #[must_use]
    pub fn new(browser: Arc<Browser>) -> Self {
        Self { browser }
    }
}

impl TabOpener for BrowserTabs {
    type Session = BrowserTab;

    async fn open(&self, url: &str) -> Result<BrowserTab> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create page")?;

        if let Err(e) = page.goto(url).await {
            // Navigation failed before a session existed; reap the page
            // here since the coordinator never sees it.
            if let Err(close_err) = page.clone().close().await {
                warn!("Failed to close page after navigation error: {close_err}");
            }
            return Err(anyhow!("Navigation to {url} failed: {e}"));
        }

        debug!("Opened tab for {url}");
        Ok(BrowserTab { page: Some(page) })
    }
}

/// A live chromiumoxide page behind the `TabSession` seam
pub struct BrowserTab {
    page: Option<Page>,
}

impl TabSession for BrowserTab {
    async fn probe_ready(&mut self) -> Result<()> {
        let page = self.page.as_ref().ok_or_else(|| anyhow!("Tab already closed"))?;
        page.evaluate("true")
            .await
            .context("Tab not answering evaluation requests")?;
        Ok(())
    }

    async fn extract(&mut self, opts: &ExtractOptions) -> Result<PageCapture> {
        let page = self.page.as_ref().ok_or_else(|| anyhow!("Tab already closed"))?;
        Ok(extract_page(page, opts).await)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            page.close().await.context("Failed to close tab")?;
        }
        Ok(())
    }
}
