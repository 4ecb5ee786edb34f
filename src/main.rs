//! courier: run the extraction agent against a backend
//!
//! Configuration comes from the persisted state file, with env overrides:
//! `COURIER_STATE_FILE`, `COURIER_SERVER_URL`, `COURIER_EMAIL`,
//! `COURIER_PASSWORD`. Logging is controlled via `RUST_LOG`.

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crawl_courier::agent::{BrowserTabs, JobPoller, PollNow};
use crawl_courier::api::ApiClient;
use crawl_courier::browser::{launch_browser, shutdown_browser};
use crawl_courier::store::AgentStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let state_path = std::env::var("COURIER_STATE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| AgentStore::default_path());
    let store = Arc::new(AgentStore::load(&state_path).await?);

    // An env-provided server URL overrides whatever the state file has;
    // the other persisted tunables stand.
    if let Ok(url) = std::env::var("COURIER_SERVER_URL") {
        let config = store.config_snapshot().with_server_base_url(url)?;
        store.set_config(config);
    }

    let config = store.config_snapshot();
    if config.server_base_url().is_empty() {
        anyhow::bail!(
            "No backend configured; set COURIER_SERVER_URL or edit {}",
            state_path.display()
        );
    }

    let client = Arc::new(ApiClient::new(config.server_base_url())?);

    if let Some(session) = store.auth() {
        client.set_token(Some(session.token));
        info!("Using persisted session for {}", config.server_base_url());
    } else if let (Ok(email), Ok(password)) = (
        std::env::var("COURIER_EMAIL"),
        std::env::var("COURIER_PASSWORD"),
    ) {
        let session = client
            .signin(&email, &password)
            .await
            .context("Sign-in failed")?;
        info!("Signed in as {}", session.email);
        store.set_auth(session);
        store.persist().await?;
    } else {
        anyhow::bail!("No stored session; set COURIER_EMAIL and COURIER_PASSWORD to sign in");
    }

    match client.health().await {
        Ok(health) => info!("Backend is {}", health.status),
        Err(e) => warn!("Backend health check failed: {e}"),
    }

    let (browser, handler_task, data_dir) = launch_browser(config.headless()).await?;
    let browser = Arc::new(browser);
    let tabs = Arc::new(BrowserTabs::new(Arc::clone(&browser)));

    let poller = JobPoller::new(Arc::clone(&client), tabs, Arc::clone(&store));
    let (trigger_tx, trigger_rx) = mpsc::channel::<PollNow>(4);

    // Kick one cycle immediately instead of waiting a full interval.
    let _ = trigger_tx.send(PollNow).await;

    info!(
        "Polling {} every {}s",
        config.server_base_url(),
        config.poll_interval_secs()
    );

    tokio::select! {
        () = poller.run(trigger_rx) => {
            warn!("Poll loop stopped");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for ctrl-c")?;
            info!("Shutting down");
        }
    }
    drop(trigger_tx);

    if let Err(e) = store.persist().await {
        warn!("Failed to persist state on shutdown: {e:#}");
    }

    // The poller owns the tab factory, which holds its own browser handle;
    // both must go before the browser can be reclaimed for a graceful close.
    drop(poller);

    match Arc::try_unwrap(browser) {
        Ok(browser) => shutdown_browser(browser, handler_task, data_dir).await,
        Err(_) => {
            warn!("Browser still referenced, skipping graceful close");
            handler_task.abort();
        }
    }

    Ok(())
}
