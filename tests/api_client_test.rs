//! Backend client against a mock HTTP server

use mockito::Matcher;

use crawl_courier::api::{ApiClient, ApiError, JobBackend, JobReport, JobStatus};

#[tokio::test]
async fn health_probe_parses_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let health = client.health().await.unwrap();

    assert_eq!(health.status, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn signin_stores_the_returned_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/signin")
        .match_body(Matcher::JsonString(
            r#"{"email":"op@example.com","password":"hunter2"}"#.into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "token": "tok-abc",
                "id": "u1",
                "email": "op@example.com",
                "createdAt": "2026-01-15T10:30:00Z",
                "isActive": true
            }"#,
        )
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let session = client.signin("op@example.com", "hunter2").await.unwrap();

    assert_eq!(session.email, "op@example.com");
    assert_eq!(client.token().as_deref(), Some("tok-abc"));
    mock.assert_async().await;
}

#[tokio::test]
async fn validate_token_distinguishes_rejection_from_outage() {
    let mut server = mockito::Server::new_async().await;
    let client = ApiClient::new(server.url()).unwrap();
    client.set_token(Some("tok-abc".into()));

    let ok = server
        .mock("GET", "/me")
        .match_header("authorization", "Bearer tok-abc")
        .with_status(200)
        .with_body(r#"{"id":"u1"}"#)
        .expect(1)
        .create_async()
        .await;
    assert!(client.validate_token().await.unwrap());
    ok.assert_async().await;

    let rejected = server
        .mock("GET", "/me")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    assert!(!client.validate_token().await.unwrap());
    rejected.assert_async().await;

    let outage = server
        .mock("GET", "/me")
        .with_status(502)
        .with_body("bad gateway")
        .expect(1)
        .create_async()
        .await;
    let err = client.validate_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status, .. } if status.as_u16() == 502));
    outage.assert_async().await;
}

#[tokio::test]
async fn validate_token_without_a_token_is_a_local_error() {
    let server = mockito::Server::new_async().await;
    let client = ApiClient::new(server.url()).unwrap();

    let err = client.validate_token().await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}

#[tokio::test]
async fn fetch_jobs_sends_limit_and_filter_and_parses_the_batch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/crawl/jobs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("deepResearchId".into(), "dr-7".into()),
        ]))
        .match_header("authorization", "Bearer tok-abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "id": "42",
                "url": "https://example.com/article",
                "status": "PENDING",
                "createdAt": "2026-01-15T10:30:00Z"
            }]"#,
        )
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    client.set_token(Some("tok-abc".into()));
    let jobs = client.fetch_jobs(10, Some("dr-7")).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "42");
    assert_eq!(jobs[0].status, JobStatus::Pending);
    mock.assert_async().await;
}

#[tokio::test]
async fn report_outcome_posts_to_the_job_result_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/crawl/jobs/42/result")
        .match_body(Matcher::PartialJsonString(
            r#"{"status":"FAILED","error":"extraction timed out"}"#.into(),
        ))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    client.set_token(Some("tok-abc".into()));
    let report = JobReport {
        status: JobStatus::Failed,
        html: None,
        error: Some("extraction timed out".into()),
        size_bytes: 0,
        duration_ms: 30_000,
    };
    client.report_outcome("42", &report).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(format!("{}/", server.url())).unwrap();
    client.health().await.unwrap();
    mock.assert_async().await;
}
