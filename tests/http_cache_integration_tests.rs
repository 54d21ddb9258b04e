//! Integration Tests for the HTTP Pipeline
//!
//! Runs cached requests through the reqwest transport against a local axum
//! origin server that counts how often it is actually hit.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use local_cache::{
    CacheContext, CacheOptions, CachedClient, FetchError, FileStorage, HttpTransport,
    MemoryStorage, Payload, Request, ResponseKind, Storage,
};
use serde_json::{json, Value};

// == Helper Functions ==

#[derive(Clone, Default)]
struct Origin {
    hits: Arc<AtomicUsize>,
}

async fn users_handler(State(origin): State<Origin>) -> Json<Value> {
    let n = origin.hits.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "users": ["ada", "grace"], "served": n }))
}

async fn echo_handler(State(origin): State<Origin>, body: String) -> String {
    origin.hits.fetch_add(1, Ordering::SeqCst);
    format!("echo:{}", body)
}

async fn broken_handler(State(origin): State<Origin>) -> (StatusCode, &'static str) {
    origin.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn empty_handler(State(origin): State<Origin>) -> StatusCode {
    origin.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn spawn_origin() -> (String, Origin) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("local_cache=debug")
        .with_test_writer()
        .try_init();

    let origin = Origin::default();
    let app = Router::new()
        .route("/users", get(users_handler))
        .route("/echo", post(echo_handler))
        .route("/broken", get(broken_handler))
        .route("/empty", get(empty_handler))
        .with_state(origin.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), origin)
}

fn client_with(storage: Arc<dyn Storage>) -> CachedClient {
    CachedClient::new(CacheContext::new(storage), Arc::new(HttpTransport::new()))
}

// == Cache Hit/Miss Tests ==

#[tokio::test]
async fn test_second_request_served_from_cache() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let client = client_with(Arc::new(MemoryStorage::new()));
    let request = Request::get(format!("{}/users", base)).expecting(ResponseKind::Json);
    let options = CacheOptions::enabled().ttl_hours(1.0);

    let first = client.fetch(request.clone(), &options).await?;
    let second = client.fetch(request, &options).await?;

    assert_eq!(origin.hits.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(first.as_json().unwrap()["served"], json!(1));
    Ok(())
}

#[tokio::test]
async fn test_cache_buster_shares_entry() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let client = client_with(Arc::new(MemoryStorage::new()));
    let options = CacheOptions::enabled();

    client
        .fetch(Request::get(format!("{}/users?_=1", base)).expecting(ResponseKind::Json), &options)
        .await?;
    client
        .fetch(Request::get(format!("{}/users?_=2", base)).expecting(ResponseKind::Json), &options)
        .await?;

    assert_eq!(origin.hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_cache_buster_keeps_encoded_query_entry() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let client = client_with(Arc::new(MemoryStorage::new()));
    let options = CacheOptions::enabled();
    let query = "q=hello%20world&tags=a,b";

    let plain = Request::get(format!("{}/users?{}", base, query)).expecting(ResponseKind::Json);

    client.fetch(plain, &options).await?;
    client
        .fetch(
            Request::get(format!("{}/users?{}&_=1700000000000", base, query))
                .expecting(ResponseKind::Json),
            &options,
        )
        .await?;

    assert_eq!(origin.hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_post_bodies_cached_separately() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let client = client_with(Arc::new(MemoryStorage::new()));
    let options = CacheOptions::enabled();
    let echo = |body: &str| Request::post(format!("{}/echo", base)).with_body(body);

    let a = client.fetch(echo("a"), &options).await?;
    let b = client.fetch(echo("b"), &options).await?;
    let a_again = client.fetch(echo("a"), &options).await?;

    assert_eq!(a, Payload::Text("echo:a".to_string()));
    assert_eq!(b, Payload::Text("echo:b".to_string()));
    assert_eq!(a_again, a);
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_uncached_requests_always_reach_origin() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_with(storage.clone());
    let request = Request::get(format!("{}/users", base)).expecting(ResponseKind::Json);

    client.fetch(request.clone(), &CacheOptions::disabled()).await?;
    client.fetch(request, &CacheOptions::disabled()).await?;

    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    assert!(storage.is_empty());
    Ok(())
}

// == Failure Tests ==

#[tokio::test]
async fn test_server_error_passes_through_uncached() {
    let (base, origin) = spawn_origin().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_with(storage.clone());
    let request = Request::get(format!("{}/broken", base));
    let options = CacheOptions::enabled().key("broken");

    let first = client.fetch(request.clone(), &options).await;
    let second = client.fetch(request, &options).await;

    assert!(matches!(first, Err(FetchError::Status { status: 500, .. })));
    assert!(matches!(second, Err(FetchError::Status { status: 500, .. })));
    assert!(storage.get_item("broken").is_none());
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_content_response_is_not_cached() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_with(storage.clone());
    let request = Request::get(format!("{}/empty", base)).expecting(ResponseKind::Json);
    let options = CacheOptions::enabled().key("empty");

    let first = client.fetch(request.clone(), &options).await?;
    let second = client.fetch(request, &options).await?;

    assert_eq!(first, Payload::Empty);
    assert_eq!(second, Payload::Empty);
    assert!(storage.get_item("empty").is_none());
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    assert_eq!(client.stats().writes, 0);
    Ok(())
}

#[tokio::test]
async fn test_quota_exceeded_is_silent() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    // Room for the TTL record, not for the response
    let storage = Arc::new(MemoryStorage::with_quota(40));
    let client = client_with(storage.clone());
    let request = Request::get(format!("{}/users", base)).expecting(ResponseKind::Json);
    let options = CacheOptions::enabled().key("users");

    let payload = client.fetch(request.clone(), &options).await?;
    assert_eq!(payload.as_json().unwrap()["users"], json!(["ada", "grace"]));
    assert!(storage.is_empty());

    client.fetch(request, &options).await?;
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    assert_eq!(client.stats().write_failures, 2);
    Ok(())
}

// == Persistence Tests ==

#[tokio::test]
async fn test_file_storage_survives_client_restart() -> anyhow::Result<()> {
    let (base, origin) = spawn_origin().await;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cache.json");
    let request = Request::get(format!("{}/users", base)).expecting(ResponseKind::Json);
    let options = CacheOptions::enabled();

    let first = client_with(Arc::new(FileStorage::open(&path, None)))
        .fetch(request.clone(), &options)
        .await?;
    let second = client_with(Arc::new(FileStorage::open(&path, None)))
        .fetch(request, &options)
        .await?;

    assert_eq!(first, second);
    assert_eq!(origin.hits.load(Ordering::SeqCst), 1);
    Ok(())
}
