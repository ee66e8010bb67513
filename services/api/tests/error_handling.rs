//! Mapping of `ApiError` values to HTTP responses.

use api_lib::error::ApiError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bloodreach_core::ports::PortError;
use http_body_util::BodyExt;
use serde_json::Value;

async fn render(error: ApiError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn client_errors_keep_their_message() {
    let cases = [
        (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        (ApiError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        (ApiError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
        (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
    ];

    for (error, expected_status, expected_code) in cases {
        let message = match &error {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m) => m.clone(),
            _ => unreachable!(),
        };
        let (status, body) = render(error).await;
        assert_eq!(status, expected_status);
        assert_eq!(body["code"], expected_code);
        assert_eq!(body["error"], message.as_str());
    }
}

#[tokio::test]
async fn port_not_found_maps_to_404() {
    let (status, body) = render(ApiError::Port(PortError::NotFound("donor 7".into()))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "donor 7");
}

#[tokio::test]
async fn storage_failures_are_sanitized() {
    let (status, body) = render(ApiError::Port(PortError::Corrupt(
        "/var/lib/bloodreach/store.json: expected value".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");
}

#[tokio::test]
async fn io_errors_are_internal() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    let (status, body) = render(ApiError::from(io)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().contains("disk"));
}
