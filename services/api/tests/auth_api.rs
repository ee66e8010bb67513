//! Registration, login, logout and session lookup over HTTP.

mod common;

use std::sync::Arc;

use api_lib::web;
use axum::http::{Method, StatusCode};
use bloodreach_core::InMemoryKeyValueStore;
use chrono::Duration;
use common::{
    body_json, build_state_at, build_test_app, build_test_state, get, login, now, post_json,
    registration, send, session_cookie, stored_sessions, ADMIN_EMAIL, SEED_PASSWORD,
};
use serde_json::json;

#[tokio::test]
async fn seeded_admin_logs_in_with_admin_view() {
    let app = build_test_app();

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": SEED_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("session="));

    let body = body_json(response).await;
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["donor"]["id"], "admin-1");
    assert_eq!(body["donor"]["role"], "admin");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = build_test_app();

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": "nope" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn email_match_is_case_sensitive() {
    let app = build_test_app();

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "IYEASIN44@gmail.com", "password": SEED_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_creates_a_logged_in_user() {
    let app = build_test_app();
    let mut payload = registration("rahim@example.com", "A+", "Khulna", "2025-01-01");
    payload["role"] = json!("admin");

    let response = post_json(&app, "/auth/register", None, payload).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["donor"]["role"], "user");
    assert_eq!(body["donor"]["isAvailable"], true);
    assert_eq!(body["donor"]["lastDonationDate"], "2025-01-01");
    let id = body["donor"]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let me = get(&app, "/me", Some(&cookie)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me_body = body_json(me).await;
    assert_eq!(me_body["donor"]["id"], id.as_str());

    // The new account can log in again with the same credentials.
    login(&app, "rahim@example.com", "secret-pass").await;
}

#[tokio::test]
async fn privileged_email_is_admin_without_admin_role() {
    let app = build_test_app();

    // Registration never grants the role, but the address is on the admin list.
    let response = post_json(
        &app,
        "/auth/register",
        None,
        registration(ADMIN_EMAIL, "O-", "Rangpur", "2024-12-01"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["donor"]["role"], "user");
    assert_eq!(body["isAdmin"], true);
}

#[tokio::test]
async fn short_phone_is_rejected() {
    let app = build_test_app();
    let mut payload = registration("short@example.com", "B-", "Comilla", "2025-01-01");
    payload["phone"] = json!("0171234");

    let response = post_json(&app, "/auth/register", None, payload).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_last_donation_date_is_rejected() {
    let app = build_test_app();
    let payload = registration("nodate@example.com", "B-", "Comilla", "");

    let response = post_json(&app, "/auth/register", None, payload).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = build_test_app();
    let mut payload = registration("noname@example.com", "B-", "Comilla", "2025-01-01");
    payload["name"] = json!("");

    let response = post_json(&app, "/auth/register", None, payload).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_session() {
    let app = build_test_app();

    let missing = get(&app, "/me", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let unknown = get(&app, "/me", Some("session=not-a-real-token")).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_forgets_the_session() {
    let app = build_test_app();
    let cookie = login(&app, "karim@example.com", SEED_PASSWORD).await;

    let response = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let me = get(&app, "/me", Some(&cookie)).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_are_independent() {
    let app = build_test_app();
    let admin = login(&app, ADMIN_EMAIL, SEED_PASSWORD).await;
    let karim = login(&app, "karim@example.com", SEED_PASSWORD).await;

    send(&app, Method::POST, "/auth/logout", Some(&karim), None).await;

    let me = get(&app, "/me", Some(&admin)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let body = body_json(me).await;
    assert_eq!(body["donor"]["id"], "admin-1");
}

#[tokio::test]
async fn login_with_a_cookie_replaces_the_old_slot() {
    let state = build_test_state();
    let app = web::router(state.clone()).unwrap();
    let credentials = json!({ "email": "karim@example.com", "password": SEED_PASSWORD });

    let mut cookie = login(&app, "karim@example.com", SEED_PASSWORD).await;
    for _ in 0..5 {
        let response = post_json(&app, "/auth/login", Some(&cookie), credentials.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let previous = std::mem::replace(&mut cookie, session_cookie(&response));

        let stale = get(&app, "/me", Some(&previous)).await;
        assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
    }

    assert_eq!(stored_sessions(&state).await, 1);
    assert_eq!(get(&app, "/me", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn registering_while_logged_in_replaces_the_old_slot() {
    let state = build_test_state();
    let app = web::router(state.clone()).unwrap();
    let cookie = login(&app, "karim@example.com", SEED_PASSWORD).await;

    let response = post_json(
        &app,
        "/auth/register",
        Some(&cookie),
        registration("second@example.com", "A+", "Khulna", "2025-01-01"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(stored_sessions(&state).await, 1);
}

#[tokio::test]
async fn abandoned_sessions_expire_and_are_purged() {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let first_day = build_state_at(kv.clone(), now());
    let app = web::router(first_day.clone()).unwrap();

    let abandoned = login(&app, "karim@example.com", SEED_PASSWORD).await;
    login(&app, "fatima@example.com", SEED_PASSWORD).await;
    login(&app, ADMIN_EMAIL, SEED_PASSWORD).await;
    assert_eq!(stored_sessions(&first_day).await, 3);

    // Same store, one day past the session lifetime.
    let later = build_state_at(kv, now() + Duration::days(31));
    let app = web::router(later.clone()).unwrap();

    let me = get(&app, "/me", Some(&abandoned)).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(stored_sessions(&later).await, 2);

    login(&app, "karim@example.com", SEED_PASSWORD).await;
    assert_eq!(stored_sessions(&later).await, 1);
}

#[tokio::test]
async fn session_cookie_lifetime_matches_the_stored_record() {
    let app = build_test_app();

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": SEED_PASSWORD }),
    )
    .await;

    let header = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(header.contains("Max-Age=2592000"));
}
