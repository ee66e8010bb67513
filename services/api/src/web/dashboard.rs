//! services/api/src/web/dashboard.rs
//!
//! The donor's own dashboard actions. Each action starts from the session's
//! snapshot of the donor, writes it through the repository and, on success,
//! refreshes the session with the stored record.

use axum::{extract::State, Extension, Json};
use bloodreach_core::Donor;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::web::auth::AuthResponse;
use crate::web::state::{AppState, CurrentSession};

fn session_donor(session: &CurrentSession) -> ApiResult<Donor> {
    session
        .context
        .user()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))
}

async fn refresh_session(
    mut session: CurrentSession,
    updated: Option<Donor>,
) -> ApiResult<Json<AuthResponse>> {
    let donor = updated
        .ok_or_else(|| ApiError::NotFound("Donor record no longer exists".to_string()))?;
    session.context.login(donor.clone()).await?;
    Ok(Json(AuthResponse {
        is_admin: session.context.is_admin(),
        donor,
    }))
}

/// POST /me/donated-today - Record a donation made today
#[utoipa::path(
    post,
    path = "/me/donated-today",
    responses(
        (status = 200, description = "Donation recorded; donor hidden from search", body = AuthResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Donor record no longer exists")
    )
)]
pub async fn donated_today_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResult<Json<AuthResponse>> {
    let donor = session_donor(&session)?;
    let updated = state.repo.mark_donated_today(&donor).await?;
    if updated.is_some() {
        info!(donor_id = %donor.id, "Donation recorded");
    }
    refresh_session(session, updated).await
}

/// POST /me/availability - Toggle whether the donor appears in search
#[utoipa::path(
    post,
    path = "/me/availability",
    responses(
        (status = 200, description = "Availability toggled", body = AuthResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Donor record no longer exists")
    )
)]
pub async fn toggle_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResult<Json<AuthResponse>> {
    let donor = session_donor(&session)?;
    let updated = state.repo.toggle_availability(&donor).await?;
    refresh_session(session, updated).await
}
