//! Request summary and action boundary logging through the pipeline.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use session_gate::config::AppConfig;
use session_gate::error::{AppError, AppResult};
use session_gate::session::{Account, Authority};
use session_gate::HttpServer;

mod common;
use common::{app, get as get_request, send, CountingStore, LogCapture};

async fn ok() -> &'static str {
    "ok"
}

async fn broken() -> AppResult<&'static str> {
    Err(AppError::Internal("database unreachable".into()))
}

fn routes() -> Router {
    Router::new()
        .route("/api/books", get(ok))
        .route("/api/broken", get(broken))
}

fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no log line containing {needle:?} in {lines:#?}"))
}

#[tokio::test]
async fn test_summary_line_for_anonymous_request() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let app = app(&AppConfig::default(), CountingStore::new(), routes());
    let response = send(app, get_request("/api/books?page=2", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary = logs.lines_containing("/api/books?page=2 GET 200");
    assert_eq!(summary.len(), 1, "{:#?}", logs.lines());
    assert!(summary[0].contains("INFO"));
    assert!(summary[0].contains("198.51.100.4 None /api/books?page=2 GET 200"));
}

#[tokio::test]
async fn test_summary_line_names_account() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let store = CountingStore::new();
    let id = store.seed(Account::new("alice", Authority::User)).await;
    let app = app(&AppConfig::default(), store, routes());
    send(app, get_request("/api/books", Some(id))).await;

    let summary = logs.lines_containing("GET 200");
    assert_eq!(summary.len(), 1);
    assert!(summary[0].contains("198.51.100.4 alice /api/books GET 200"));
}

#[tokio::test]
async fn test_custom_template_with_unknown_field() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let mut config = AppConfig::default();
    config.logging.request_log_format = "method=${method} bogus=[${bogus}] status=${status}".into();
    let app = app(&config, CountingStore::new(), routes());
    send(app, get_request("/api/books", None)).await;

    assert_eq!(
        logs.lines_containing("method=GET bogus=[] status=200").len(),
        1
    );
}

#[tokio::test]
async fn test_boundary_lines_nest_inside_summary() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let app = app(&AppConfig::default(), CountingStore::new(), routes());
    send(app, get_request("/api/books", None)).await;

    let lines = logs.lines();
    let start = position(&lines, "/api/books Action Start");
    let end = position(&lines, "/api/books Action End");
    let summary = position(&lines, "/api/books GET 200");
    assert!(start < end && end < summary, "{lines:#?}");
    assert!(lines[start].contains("DEBUG"));
    assert!(lines[end].contains("DEBUG"));
}

#[tokio::test]
async fn test_boundary_lines_survive_handler_error() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let app = app(&AppConfig::default(), CountingStore::new(), routes());
    let response = send(app, get_request("/api/broken", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(logs.lines_containing("/api/broken Action Start").len(), 1);
    assert_eq!(logs.lines_containing("/api/broken Action End").len(), 1);

    let failure = logs.lines_containing("Action failed");
    assert_eq!(failure.len(), 1);
    assert!(failure[0].contains("ERROR"));
    assert!(failure[0].contains("database unreachable"));

    assert_eq!(logs.lines_containing("/api/broken GET 500").len(), 1);
}

#[tokio::test]
async fn test_denied_request_still_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let mut config = AppConfig::default();
    config.security.enabled = true;
    config.security.auth_paths = vec!["^/api/".into()];
    let app = app(&config, CountingStore::new(), routes());
    let response = send(app, get_request("/api/books", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(logs.lines_containing("/api/books Action Start").len(), 1);
    assert_eq!(logs.lines_containing("/api/books Action End").len(), 1);
    assert_eq!(logs.lines_containing("None /api/books GET 401").len(), 1);
}

#[tokio::test]
async fn test_timed_out_request_still_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let mut config = AppConfig::default();
    config.timeouts.request_secs = 1;
    let routes = Router::new().route(
        "/api/slow",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            "too late"
        }),
    );
    let server = HttpServer::new(config, routes).await.unwrap();

    let response = send(server.router(), get_request("/api/slow", None)).await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    assert_eq!(logs.lines_containing("/api/slow Action Start").len(), 1);
    assert_eq!(logs.lines_containing("/api/slow Action End").len(), 1);
    assert_eq!(logs.lines_containing("None /api/slow GET 408").len(), 1);
}
