use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::COOKIE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use marquee_common::{PingResponse, ReporterError, VisitorId, PING_PATH};
use marquee_config::Consistency;
use marquee_registry::{
    build_router, cors_layer, serve, AppState, MemoryStore, RegistryService, SystemClock,
};
use tokio::net::TcpListener;

use super::*;
use crate::cookie::VisitorCookie;

fn identity(id: i32) -> VisitorIdentity {
    VisitorIdentity {
        id: VisitorId::new(id),
        cookie: VisitorCookie::new(
            "visitor_id",
            id.to_string(),
            chrono::Duration::hours(24),
            Utc::now(),
        ),
    }
}

/// Serve `router` on a loopback port until the returned token is cancelled.
async fn spawn(router: Router) -> (String, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(serve(listener, router, async move { token.cancelled().await }));
    (format!("http://{addr}"), shutdown)
}

#[derive(Clone, Default)]
struct Script {
    hits: Arc<AtomicUsize>,
    /// Requests answered with a count before the server starts failing.
    healthy: usize,
    delay: Duration,
    cookies: Arc<Mutex<Vec<String>>>,
}

async fn scripted(State(script): State<Script>, headers: HeaderMap) -> Response {
    let n = script.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(cookie) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        script.cookies.lock().unwrap().push(cookie.to_string());
    }
    tokio::time::sleep(script.delay).await;

    if n < script.healthy {
        Json(PingResponse::ok(n as u64 + 3)).into_response()
    } else {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

async fn spawn_scripted(script: Script) -> (String, CancellationToken) {
    let router = Router::new()
        .route(PING_PATH, get(scripted))
        .with_state(script);
    spawn(router).await
}

async fn first_count(rx: &mut watch::Receiver<Option<u64>>) -> u64 {
    let count = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(Option::is_some))
        .await
        .expect("reporter never published a count")
        .unwrap();
    (*count).unwrap_or_default()
}

#[tokio::test]
async fn first_report_is_immediate() {
    let script = Script {
        healthy: usize::MAX,
        ..Default::default()
    };
    let (url, _server) = spawn_scripted(script.clone()).await;

    let client = PingClient::new(&url, None).unwrap();
    let mut handle = PresenceReporter::start(client, identity(42), Duration::from_secs(3600));
    let mut rx = handle.subscribe();

    assert_eq!(first_count(&mut rx).await, 3);
    assert_eq!(handle.count(), Some(3));
    assert_eq!(script.hits.load(Ordering::SeqCst), 1);
    assert_eq!(script.cookies.lock().unwrap().as_slice(), ["visitor_id=42"]);

    handle.stop().await;
    assert!(!handle.is_running());
}

#[tokio::test]
async fn failure_keeps_stale_count() {
    let script = Script {
        healthy: 1,
        ..Default::default()
    };
    let (url, _server) = spawn_scripted(script.clone()).await;

    let client = PingClient::new(&url, None).unwrap();
    let mut handle = PresenceReporter::start(client, identity(1), Duration::from_millis(20));
    let mut rx = handle.subscribe();
    assert_eq!(first_count(&mut rx).await, 3);

    for _ in 0..100 {
        if script.hits.load(Ordering::SeqCst) >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(script.hits.load(Ordering::SeqCst) >= 3);
    assert_eq!(handle.count(), Some(3));

    handle.stop().await;
}

#[tokio::test]
async fn unreachable_server_leaves_count_empty() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PingClient::new(&format!("http://{addr}"), Some(Duration::from_secs(1))).unwrap();
    let mut handle = PresenceReporter::start(client, identity(1), Duration::from_millis(20));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.count(), None);
    assert!(handle.is_running());

    handle.stop().await;
}

#[tokio::test]
async fn stop_abandons_in_flight_report() {
    let script = Script {
        healthy: usize::MAX,
        delay: Duration::from_secs(30),
        ..Default::default()
    };
    let (url, _server) = spawn_scripted(script.clone()).await;

    let client = PingClient::new(&url, None).unwrap();
    let mut handle = PresenceReporter::start(client, identity(7), Duration::from_secs(3600));

    for _ in 0..100 {
        if script.hits.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(script.hits.load(Ordering::SeqCst), 1);

    tokio::time::timeout(Duration::from_secs(3), handle.stop())
        .await
        .expect("stop() waited on the in-flight report");

    assert!(!handle.is_running());
    assert_eq!(handle.count(), None);
}

#[tokio::test]
async fn dropping_handle_stops_reporting() {
    let script = Script {
        healthy: usize::MAX,
        ..Default::default()
    };
    let (url, _server) = spawn_scripted(script.clone()).await;

    let client = PingClient::new(&url, None).unwrap();
    let handle = PresenceReporter::start(client, identity(7), Duration::from_millis(20));
    let mut rx = handle.subscribe();
    first_count(&mut rx).await;
    drop(handle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_drop = script.hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(script.hits.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn ping_rejects_error_status() {
    let (url, _server) = spawn_scripted(Script::default()).await;
    let client = PingClient::new(&url, None).unwrap();

    let err = client.ping(&identity(1)).await.unwrap_err();
    assert!(matches!(err, ReporterError::Status(500)));
}

#[tokio::test]
async fn ping_rejects_malformed_body() {
    let router = Router::new().route(PING_PATH, get(|| async { "not json" }));
    let (url, _server) = spawn(router).await;
    let client = PingClient::new(&url, None).unwrap();

    let err = client.ping(&identity(1)).await.unwrap_err();
    assert!(matches!(err, ReporterError::Parse(_)));
}

#[tokio::test]
async fn reports_against_registry() {
    let service = RegistryService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
        30,
        Consistency::Atomic,
    )
    .unwrap();
    let state = Arc::new(AppState::new(service, "x-real-ip").unwrap());
    let (url, _server) = spawn(build_router(state, cors_layer(&[]).unwrap())).await;

    // Trailing slash on the base URL is tolerated.
    let client = PingClient::new(&format!("{url}/"), None).unwrap();
    assert_eq!(client.ping(&identity(100)).await.unwrap(), 1);

    let mut handle = PresenceReporter::start(client, identity(200), Duration::from_secs(3600));
    let mut rx = handle.subscribe();
    assert_eq!(first_count(&mut rx).await, 2);

    handle.stop().await;
}
