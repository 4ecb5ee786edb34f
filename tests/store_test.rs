//! Persistence of the agent state file

use chrono::Utc;

use crawl_courier::api::AuthSession;
use crawl_courier::config::AgentConfig;
use crawl_courier::diag::{CrawlRecord, LogEntry, LogLevel, LogSource, PollSummary};
use crawl_courier::store::AgentStore;

fn session() -> AuthSession {
    AuthSession {
        token: "tok-123".into(),
        id: "u1".into(),
        email: "operator@example.com".into(),
        created_at: Utc::now(),
        is_active: true,
    }
}

fn record(job_id: &str) -> CrawlRecord {
    CrawlRecord {
        job_id: job_id.to_string(),
        url: format!("http://example.com/{job_id}"),
        succeeded: true,
        size_bytes: 1_024,
        duration_ms: 2_500,
        finished_at: Utc::now(),
        error: None,
    }
}

#[tokio::test]
async fn missing_file_starts_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::load(dir.path().join("state.json")).await.unwrap();

    assert!(store.auth().is_none());
    assert!(store.last_poll().is_none());
    assert!(store.history().is_empty());
    let config = store.config_snapshot();
    assert!(config.poll_enabled());
    assert_eq!(config.poll_interval_secs(), 30);
}

#[tokio::test]
async fn state_survives_a_persist_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = AgentStore::load(&path).await.unwrap();
    store.set_auth(session());
    store.set_config(
        AgentConfig::builder()
            .server_base_url("https://backend.example.com")
            .unwrap()
            .poll_interval_secs(60)
            .build(),
    );
    store.record_poll(PollSummary {
        started_at: Utc::now(),
        jobs_found: 4,
        jobs_processed: 3,
    });
    store.push_history(record("1"));
    store.append_log(LogEntry::new(
        LogLevel::Success,
        LogSource::Background,
        "Extracted 1024 bytes in 2500ms",
    ));
    store.persist().await.unwrap();

    let reloaded = AgentStore::load(&path).await.unwrap();
    assert_eq!(reloaded.auth().unwrap().token, "tok-123");
    let config = reloaded.config_snapshot();
    assert_eq!(config.server_base_url(), "https://backend.example.com");
    assert_eq!(config.poll_interval_secs(), 60);
    assert_eq!(reloaded.last_poll().unwrap().jobs_processed, 3);
    assert_eq!(reloaded.history().len(), 1);
    assert_eq!(reloaded.log_entries().len(), 1);
}

#[tokio::test]
async fn history_is_capped_with_oldest_evicted_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::load(dir.path().join("state.json")).await.unwrap();

    for i in 0..120 {
        store.push_history(record(&i.to_string()));
    }

    let history = store.history();
    assert_eq!(history.len(), 100);
    assert_eq!(history.first().unwrap().job_id, "20");
    assert_eq!(history.last().unwrap().job_id, "119");
}

#[tokio::test]
async fn clearing_auth_drops_only_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::load(dir.path().join("state.json")).await.unwrap();
    store.set_auth(session());
    store.push_history(record("1"));

    store.clear_auth();

    assert!(store.auth().is_none());
    assert_eq!(store.history().len(), 1, "history is unrelated to auth");
}

#[tokio::test]
async fn corrupt_state_file_is_an_error_not_a_silent_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    tokio::fs::write(&path, b"{ not json").await.unwrap();

    let err = AgentStore::load(&path).await.unwrap_err();
    assert!(format!("{err:#}").contains("Corrupt state file"));
}

#[tokio::test]
async fn shrinking_log_capacity_in_config_trims_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = AgentStore::load(&path).await.unwrap();
    for i in 0..50 {
        store.append_log(LogEntry::new(
            LogLevel::Info,
            LogSource::Background,
            format!("entry {i}"),
        ));
    }
    store.set_config(
        AgentConfig::builder()
            .server_base_url("https://backend.example.com")
            .unwrap()
            .log_capacity(10)
            .build(),
    );
    store.persist().await.unwrap();

    let reloaded = AgentStore::load(&path).await.unwrap();
    let entries = reloaded.log_entries();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries.last().unwrap().message, "entry 49");
}
