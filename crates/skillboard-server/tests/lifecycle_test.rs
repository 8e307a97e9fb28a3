//! End-to-end tests against a really bound listener

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use skillboard_persistence::{Database, MigrationSource, SchemaMigrator};
use skillboard_server::{
    FrontendDelivery, HttpConfig, HttpServer, ProxyDelivery, StaticDelivery, SHUTDOWN_TIMEOUT,
};
use tempfile::{tempdir, TempDir};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

fn local_config() -> HttpConfig {
    HttpConfig {
        addr: "127.0.0.1:0".to_string(),
    }
}

async fn create_test_db() -> (Database, TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().unwrap()).await.unwrap();
    SchemaMigrator::new(MigrationSource::Builtin.load().unwrap())
        .run(&db)
        .await
        .unwrap();
    (db, dir)
}

struct RunningServer {
    base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start(db: Database, frontend: Arc<dyn FrontendDelivery>) -> RunningServer {
    let server = HttpServer::bind(&local_config(), db, frontend).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(async move {
        let _ = rx.await;
    }));
    RunningServer {
        base_url: format!("http://{}", addr),
        shutdown,
        handle,
    }
}

/// Stand-in for the front-end dev server
async fn start_dev_server() -> SocketAddr {
    let app = Router::new()
        .route("/", get(|| async { "hello from dev server" }))
        .route("/echo", axum::routing::post(|body: String| async move { body }))
        .route(
            "/pause",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                "done"
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "too late"
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_serve_then_shutdown_closes_store() {
    let (db, _tmp) = create_test_db().await;
    let assets = tempdir().unwrap();
    std::fs::write(assets.path().join("index.html"), "<h1>Skill List</h1>").unwrap();

    let server = start(db.clone(), Arc::new(StaticDelivery::new(assets.path()))).await;
    let client = reqwest::Client::new();

    let created = client
        .post(format!("{}/api/skill", server.base_url))
        .header("Content-Type", "application/json")
        .body(r#"{"skill": {"name": "Go", "description": "systems lang"}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), reqwest::StatusCode::OK);
    assert_eq!(
        created.text().await.unwrap(),
        r#"{"skill":{"skill_id":1,"name":"Go","description":"systems lang"}}"#
    );

    let index = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(index.status(), reqwest::StatusCode::OK);
    assert_eq!(index.text().await.unwrap(), "<h1>Skill List</h1>");

    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();

    assert!(db.is_closed());
    assert!(client
        .get(format!("{}/api/skill", server.base_url))
        .send()
        .await
        .is_err());
}

#[tokio::test]
async fn test_dev_mode_proxies_unmatched_requests() {
    let dev_addr = start_dev_server().await;
    let (db, _tmp) = create_test_db().await;
    let proxy = ProxyDelivery::new(&format!("http://{}", dev_addr)).unwrap();

    let server = start(db, Arc::new(proxy)).await;
    let client = reqwest::Client::new();

    let root = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(root.status(), reqwest::StatusCode::OK);
    assert_eq!(root.text().await.unwrap(), "hello from dev server");

    let echo = client
        .post(format!("{}/echo", server.base_url))
        .body("ping")
        .send()
        .await
        .unwrap();
    assert_eq!(echo.text().await.unwrap(), "ping");

    // API routes are still served locally
    let api = client
        .get(format!("{}/api/skill", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(api.text().await.unwrap(), r#"{"skills":[]}"#);

    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_drain_is_bounded() {
    let dev_addr = start_dev_server().await;
    let (db, _tmp) = create_test_db().await;
    let proxy = ProxyDelivery::new(&format!("http://{}", dev_addr)).unwrap();
    let server = start(db.clone(), Arc::new(proxy)).await;

    let slow_url = format!("{}/slow", server.base_url);
    let in_flight = tokio::spawn(async move { reqwest::get(slow_url).await });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let started = Instant::now();
    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= SHUTDOWN_TIMEOUT - Duration::from_millis(500));
    assert!(elapsed < SHUTDOWN_TIMEOUT + Duration::from_secs(3));
    assert!(db.is_closed());

    // The connection was cut, so the client never gets an answer
    let outcome = tokio::time::timeout(Duration::from_secs(2), in_flight)
        .await
        .expect("in-flight request still running after shutdown")
        .unwrap();
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_shutdown_waits_for_short_requests() {
    let dev_addr = start_dev_server().await;
    let (db, _tmp) = create_test_db().await;
    let proxy = ProxyDelivery::new(&format!("http://{}", dev_addr)).unwrap();
    let server = start(db.clone(), Arc::new(proxy)).await;

    let pause_url = format!("{}/pause", server.base_url);
    let in_flight = tokio::spawn(async move { reqwest::get(pause_url).await });
    tokio::time::sleep(Duration::from_millis(300)).await;

    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "done");
    assert!(db.is_closed());
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let (db, _tmp) = create_test_db().await;
    let first = HttpServer::bind(&local_config(), db.clone(), Arc::new(StaticDelivery::new(".")))
        .await
        .unwrap();
    let taken = HttpConfig {
        addr: first.local_addr().unwrap().to_string(),
    };

    let second = HttpServer::bind(&taken, db, Arc::new(StaticDelivery::new("."))).await;

    assert!(second.is_err());
}
