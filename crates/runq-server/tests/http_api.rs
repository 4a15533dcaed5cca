//! Integration tests for the HTTP surface.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, body_text, build_app, get, location, post_form, router_for};
use runq_core::RunnerConfig;
use runq_core::impls::ScriptedExecutor;

fn static_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
    dir
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_redirects_to_the_result_page() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());
    let router = router_for(&app, dir.path());

    let response = post_form(router, "/submit", "pkg=alpha").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/result/alpha");
}

#[tokio::test]
async fn redirect_location_is_percent_encoded() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());
    let router = router_for(&app, dir.path());

    let response = post_form(router, "/submit", "pkg=github.com%2Facme%2Fmy+widget").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/result/github.com/acme/my%20widget");
}

#[tokio::test]
async fn empty_pkg_is_a_bad_request() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let empty = post_form(router_for(&app, dir.path()), "/submit", "pkg=").await;
    let missing = post_form(router_for(&app, dir.path()), "/submit", "").await;

    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(empty).await.contains("pkg not set"));
}

#[tokio::test]
async fn dot_segments_in_pkg_are_rejected() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let parent = post_form(router_for(&app, dir.path()), "/submit", "pkg=a%2F..%2Fb").await;
    let current = post_form(router_for(&app, dir.path()), "/submit", "pkg=.%2Fx").await;

    assert_eq!(parent.status(), StatusCode::BAD_REQUEST);
    assert_eq!(current.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(parent).await.contains("path segments"));

    let stats = body_json(get(router_for(&app, dir.path()), "/api/queue").await).await;
    assert_eq!(stats["depth"], 0);
}

#[tokio::test]
async fn busy_server_returns_503_once_over_the_threshold() {
    let dir = static_dir();
    // worker is never started, so the queue only grows
    let app = build_app(
        ScriptedExecutor::new(["x"]),
        RunnerConfig {
            queue_capacity: 4,
            admission_ratio: 0.75,
        },
    );

    for i in 0..4 {
        let response = post_form(router_for(&app, dir.path()), "/submit", &format!("pkg=job-{i}")).await;
        assert_eq!(response.status(), StatusCode::FOUND, "job-{i} should be admitted");
    }
    let rejected = post_form(router_for(&app, dir.path()), "/submit", "pkg=beta").await;

    assert_eq!(rejected.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(rejected).await.contains("server too busy"));

    let unknown = get(router_for(&app, dir.path()), "/api/status/beta").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Status API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_status_is_404_json() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let response = get(router_for(&app, dir.path()), "/api/status/never-submitted").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn queued_job_reports_unfinished_placeholder() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());
    post_form(router_for(&app, dir.path()), "/submit", "pkg=alpha").await;

    let response = get(router_for(&app, dir.path()), "/api/status/alpha").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["Finished"], false);
    assert_eq!(json["Result"], "");
    assert_eq!(json["Link"], "/result/alpha");
}

#[tokio::test]
async fn job_lifecycle_over_http() {
    let dir = static_dir();
    let app = build_app(
        ScriptedExecutor::new(["procs ", "memory\n"]).with_delay(Duration::from_millis(10)),
        RunnerConfig::default(),
    );
    let router = router_for(&app, dir.path());
    let (_, worker) = app.start();

    let submitted = post_form(router.clone(), "/submit", "pkg=alpha").await;
    assert_eq!(submitted.status(), StatusCode::FOUND);

    let mut last_len = 0;
    let json = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let json = body_json(get(router.clone(), "/api/status/alpha").await).await;
            let len = json["Result"].as_str().unwrap().len();
            assert!(len >= last_len, "output must never shrink");
            last_len = len;
            if json["Finished"] == true {
                return json;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job should finish");

    assert_eq!(json["Result"], "procs memory\n");

    let page = get(router.clone(), "/result/alpha").await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("procs memory"));
    assert!(html.contains("data-finished=\"true\""));

    worker.shutdown_and_join().await;
}

#[tokio::test]
async fn queue_stats_endpoint() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());
    post_form(router_for(&app, dir.path()), "/submit", "pkg=a").await;

    let json = body_json(get(router_for(&app, dir.path()), "/api/queue").await).await;

    assert_eq!(json["depth"], 1);
    assert_eq!(json["capacity"], 100);
    assert_eq!(json["threshold"], 75);
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_has_the_submission_form() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let response = get(router_for(&app, dir.path()), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("action=\"/submit\""));
    assert!(html.contains("name=\"pkg\""));
}

#[tokio::test]
async fn unknown_result_page_is_404() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let response = get(router_for(&app, dir.path()), "/result/never-submitted").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let response = get(router_for(&app, dir.path()), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("404"));
}

#[tokio::test]
async fn static_files_are_served() {
    let dir = static_dir();
    let app = build_app(ScriptedExecutor::new(["x"]), RunnerConfig::default());

    let response = get(router_for(&app, dir.path()), "/static/style.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "body {}");
}
