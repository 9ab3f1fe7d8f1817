//! Integration tests for the HTTP, GitHub and file sinks against local servers.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{post, put};
use axum::{Json, Router};
use base64::Engine as _;
use common::{file, start_time, ROOT};
use journal_core::filter::SkipFilter;
use journal_core::clock::ManualClock;
use journal_core::config::GitHubConfig;
use journal_core::error::Error;
use journal_core::flush::{FlushTrigger, Flusher};
use journal_core::project::ProjectId;
use journal_core::report::JournalReport;
use journal_core::session::{FileSession, FinalizedBatch, SessionTracker};
use journal_core::sink::file::FileSink;
use journal_core::sink::github::GitHubSink;
use journal_core::sink::http::HttpSink;
use journal_core::sink::SessionSink;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(5);

fn report() -> JournalReport {
    let mut session = FileSession::new(file("src/main.rs"), start_time());
    session.record_save();
    session.close(start_time() + chrono::Duration::minutes(12));

    let mut batch = FinalizedBatch::new();
    batch.insert(ProjectId::new(ROOT), vec![session]);
    JournalReport::from_batch(&batch, start_time() + chrono::Duration::minutes(15))
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
}

#[tokio::test]
async fn test_http_sink_posts_report_json() {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/api/activity",
            post(
                |State(state): State<Captured>, Json(body): Json<Value>| async move {
                    state.bodies.lock().unwrap().push(body);
                    StatusCode::CREATED
                },
            ),
        )
        .with_state(captured.clone());
    let base = serve(app).await;

    let sink = HttpSink::new(&format!("{base}/api/activity"), TIMEOUT).unwrap();
    sink.push(&report()).await.unwrap();

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let project = &bodies[0]["projects"][0];
    assert_eq!(project["project"], json!(ROOT));
    assert_eq!(project["sessions"][0]["file_uri"], json!(file("src/main.rs")));
    assert_eq!(project["sessions"][0]["saves_count"], json!(1));
}

#[tokio::test]
async fn test_http_sink_maps_rejection() {
    let app = Router::new().route(
        "/api/activity",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let base = serve(app).await;

    let sink = HttpSink::new(&format!("{base}/api/activity"), TIMEOUT).unwrap();
    let err = sink.push(&report()).await.unwrap_err();

    match &err {
        Error::RemoteRejected { status, message } => {
            assert_eq!(*status, 503);
            assert!(message.contains("maintenance"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_http_sink_unreachable_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = HttpSink::new(&format!("http://{addr}/api/activity"), TIMEOUT).unwrap();
    let err = sink.push(&report()).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "{err}");
}

fn github_config(api_url: String, token_env: &str) -> GitHubConfig {
    GitHubConfig {
        owner: Some("octo".to_string()),
        repo: Some("notes".to_string()),
        branch: Some("main".to_string()),
        directory: "journal".to_string(),
        token_env: token_env.to_string(),
        api_url,
    }
}

async fn contents_put(
    State(state): State<Captured>,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.headers.lock().unwrap().push(headers);
    state.bodies.lock().unwrap().push(json!({
        "owner": owner,
        "repo": repo,
        "path": path,
        "body": body,
    }));
    (StatusCode::CREATED, Json(json!({ "content": { "sha": "new" } })))
}

#[tokio::test]
async fn test_github_sink_creates_file() {
    std::env::set_var("JOURNAL_TEST_TOKEN_CREATE", "secret-token");

    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            put(contents_put),
        )
        .with_state(captured.clone());
    let base = serve(app).await;

    let sink =
        GitHubSink::from_config(&github_config(base, "JOURNAL_TEST_TOKEN_CREATE"), TIMEOUT)
            .unwrap();
    let report = report();
    sink.push(&report).await.unwrap();

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let call = &bodies[0];
    assert_eq!(call["owner"], json!("octo"));
    assert_eq!(call["repo"], json!("notes"));
    assert_eq!(call["path"], json!(format!("journal/{}", report.file_name())));
    assert_eq!(call["body"]["branch"], json!("main"));
    assert!(call["body"].get("sha").is_none());

    let content = call["body"]["content"].as_str().unwrap();
    let markdown = String::from_utf8(
        base64::engine::general_purpose::STANDARD
            .decode(content)
            .unwrap(),
    )
    .unwrap();
    assert!(markdown.contains("### main.rs"));

    let headers = captured.headers.lock().unwrap();
    assert_eq!(
        headers[0].get("authorization").unwrap(),
        "Bearer secret-token"
    );
}

#[tokio::test]
async fn test_github_sink_never_overwrites_existing_file() {
    std::env::set_var("JOURNAL_TEST_TOKEN_EXISTS", "secret-token");

    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            put(
                |State(state): State<Captured>, Json(body): Json<Value>| async move {
                    state.bodies.lock().unwrap().push(body);
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        r#"{"message":"Invalid request. \"sha\" wasn't supplied."}"#,
                    )
                },
            ),
        )
        .with_state(captured.clone());
    let base = serve(app).await;

    let sink =
        GitHubSink::from_config(&github_config(base, "JOURNAL_TEST_TOKEN_EXISTS"), TIMEOUT)
            .unwrap();
    let err = sink.push(&report()).await.unwrap_err();

    assert!(matches!(err, Error::RemoteRejected { status: 422, .. }), "{err}");
    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("sha").is_none());
}

#[tokio::test]
async fn test_github_sink_rejected_write() {
    std::env::set_var("JOURNAL_TEST_TOKEN_REJECT", "bad-token");

    let app = Router::new().route(
        "/repos/{owner}/{repo}/contents/{*path}",
        put(|| async { (StatusCode::UNAUTHORIZED, "Bad credentials") }),
    );
    let base = serve(app).await;

    let sink =
        GitHubSink::from_config(&github_config(base, "JOURNAL_TEST_TOKEN_REJECT"), TIMEOUT)
            .unwrap();
    let err = sink.push(&report()).await.unwrap_err();

    assert!(matches!(err, Error::RemoteRejected { status: 401, .. }), "{err}");
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_file_sink_writes_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new(dir.path().join("journals"));
    let report = report();

    sink.push(&report).await.unwrap();

    let written = std::fs::read_to_string(dir.path().join("journals").join(report.file_name()))
        .unwrap();
    assert_eq!(written, report.render_markdown());
}

#[tokio::test]
async fn test_file_sink_keeps_reports_flushed_in_the_same_second() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(start_time());
    let project = ProjectId::new(ROOT);
    let mut tracker = SessionTracker::with_clock(Arc::new(clock.clone()), SkipFilter::default());
    let mut flusher = Flusher::new(Box::new(FileSink::new(dir.path().to_path_buf())))
        .with_clock(Arc::new(clock.clone()));

    tracker.open(&project, &file("a.rs"));
    tracker.close(&project, &file("a.rs"));
    assert!(flusher
        .flush(&mut tracker, FlushTrigger::Manual)
        .await
        .is_synced());

    clock.advance(chrono::Duration::milliseconds(300));
    tracker.open(&project, &file("b.rs"));
    tracker.close(&project, &file("b.rs"));
    assert!(flusher
        .flush(&mut tracker, FlushTrigger::Shutdown)
        .await
        .is_synced());

    let documents: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().any(|d| d.contains("### a.rs")));
    assert!(documents.iter().any(|d| d.contains("### b.rs")));
    assert_eq!(tracker.finalized_count(), 0);
}
