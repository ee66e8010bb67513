//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::error::ApiError;
use crate::web::state::{AppState, CurrentSession};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Extracts the session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        c.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Middleware that restores the session named by the session cookie.
///
/// If a donor is logged in, inserts a `CurrentSession` into request extensions.
/// If the cookie is missing or the session is empty, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("No session found".to_string()))?;

    let context = state.open_session(&token).await.map_err(|e| {
        error!("Failed to restore session: {:?}", e);
        ApiError::Port(e)
    })?;
    if !context.is_authenticated() {
        return Err(ApiError::Unauthorized("Session expired or logged out".to_string()));
    }

    req.extensions_mut().insert(CurrentSession { context });
    Ok(next.run(req).await)
}

/// Middleware that admits only admins. Must run after `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<CurrentSession>()
        .is_some_and(|session| session.context.is_admin());
    if !is_admin {
        return Err(ApiError::Forbidden("Administrator access required".to_string()));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=bn"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn empty_or_similarly_named_cookies_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session_hint=1; session="),
        );
        assert_eq!(session_token(&headers), None);
    }
}
