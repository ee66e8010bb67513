//! Shared helpers for the HTTP integration tests.
//!
//! Every test gets its own in-memory store, a clock pinned to
//! 2025-06-01T00:00:00Z unless stated otherwise, and zero artificial latency.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use api_lib::config::{Config, StorageBackend};
use api_lib::web::{self, state::AppState};
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use bloodreach_core::{
    AdminPolicy, Clock, DonorRepository, FixedClock, InMemoryKeyValueStore, KeyValueStore,
    KvDonorStore, Latency, SessionLifetime, StatsOffsets,
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tracing::Level;

pub const ADMIN_EMAIL: &str = "iyeasin44@gmail.com";
pub const SEED_PASSWORD: &str = "password123";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// Build a test `Config` with safe defaults.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        log_level: Level::INFO,
        app_name: "bloodreach".to_string(),
        storage_backend: StorageBackend::Memory,
        data_path: PathBuf::from("unused.json"),
        database_url: None,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        latency: Latency::none(),
        stats_offsets: StatsOffsets::default(),
        cors_origin: "http://localhost:3000".to_string(),
        session_max_age: chrono::Duration::days(30),
    }
}

pub fn build_test_state() -> Arc<AppState> {
    build_state_at(Arc::new(InMemoryKeyValueStore::new()), now())
}

/// A state over `kv` whose clock reads `instant`. States sharing a store
/// see the same donors and sessions.
pub fn build_state_at(kv: Arc<InMemoryKeyValueStore>, instant: DateTime<Utc>) -> Arc<AppState> {
    let config = test_config();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(instant));
    let store = Arc::new(KvDonorStore::new(kv.clone(), &config.app_name));
    let repo = DonorRepository::new(store, clock.clone())
        .with_latency(config.latency)
        .with_stats_offsets(config.stats_offsets);

    Arc::new(AppState {
        repo: Arc::new(repo),
        sessions: kv,
        admin_policy: Arc::new(AdminPolicy::new(config.admin_emails.clone())),
        session_lifetime: SessionLifetime::expiring(clock, config.session_max_age),
        config: Arc::new(config),
    })
}

/// Build the full application router over a fresh in-memory state.
pub fn build_test_app() -> Router {
    web::router(build_test_state()).unwrap()
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, cookie, None).await
}

pub async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, cookie, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `session=<token>` pair from a `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("response must set a cookie")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().trim().to_string()
}

/// Number of token-keyed session records in the store.
pub async fn stored_sessions(state: &AppState) -> usize {
    state
        .sessions
        .keys_with_prefix("bloodreach_user:")
        .await
        .unwrap()
        .len()
}

/// Logs in and returns the session cookie.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/auth/login",
        None,
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    session_cookie(&response)
}

/// A valid registration payload.
pub fn registration(email: &str, blood_group: &str, district: &str, last_donation: &str) -> Value {
    serde_json::json!({
        "name": "Test Donor",
        "email": email,
        "password": "secret-pass",
        "phone": "01712345678",
        "bloodGroup": blood_group,
        "district": district,
        "gender": "Male",
        "lastDonationDate": last_donation,
        "institute": "",
        "willChangeLocation": false
    })
}
