//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for donor registration, login, logout and the
//! current-session lookup.
//!
//! Passwords are stored and compared in plain text, matching the donor
//! records the directory was built around. A production deployment must
//! switch to salted hashes before accepting real users.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use bloodreach_core::domain::{optional_date, BloodGroup, District, Donor, Gender, NewDonor, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::web::middleware::{session_token, SESSION_COOKIE};
use crate::web::state::{AppState, CurrentSession};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 11, message = "Phone number must have at least 11 digits"))]
    pub phone: String,
    pub blood_group: BloodGroup,
    pub district: District,
    pub gender: Gender,
    #[serde(default, with = "optional_date")]
    #[validate(required(message = "Last donation date is required"))]
    #[schema(value_type = String, format = Date)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default)]
    pub will_change_location: bool,
    #[serde(default)]
    pub years_until_change: Option<u32>,
    #[serde(default)]
    pub target_district: Option<District>,
}

impl RegisterRequest {
    /// New registrations are plain users and start out available.
    fn into_new_donor(self) -> NewDonor {
        NewDonor {
            name: self.name,
            email: Some(self.email),
            password: Some(self.password),
            role: Role::User,
            phone: self.phone,
            blood_group: self.blood_group,
            district: self.district,
            gender: self.gender,
            last_donation_date: self.last_donation_date,
            is_available: true,
            institute: self.institute,
            will_change_location: self.will_change_location,
            years_until_change: self.years_until_change,
            target_district: self.target_district,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The logged-in donor and whether the client should show the admin dashboard.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub donor: Donor,
    pub is_admin: bool,
}

fn session_cookie(token: &str, max_age: chrono::Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.num_seconds()
    )
}

/// Logs `donor` into a fresh session slot and returns its token.
///
/// The slot named by the request's existing cookie, if any, is dropped first,
/// and expired slots are purged, so repeated logins do not accumulate records.
async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    donor: Donor,
) -> ApiResult<(String, AuthResponse)> {
    if let Some(previous) = session_token(headers) {
        state.open_session(&previous).await?.logout().await?;
    }
    state.purge_expired_sessions().await?;

    let token = Uuid::new_v4().to_string();
    let mut session = state.open_session(&token).await?;
    session.login(donor.clone()).await.map_err(|e| {
        error!("Failed to persist session: {:?}", e);
        ApiError::Port(e)
    })?;
    let response = AuthResponse {
        is_admin: session.is_admin(),
        donor,
    };
    Ok((token, response))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Register a donor and log them in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Donor registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let donor = state.repo.register(req.into_new_donor()).await?;
    let (token, response) = start_session(&state, &headers, donor).await?;
    info!(donor_id = %response.donor.id, "Donor registered and logged in");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token, state.config.session_max_age))],
        Json(response),
    ))
}

/// POST /auth/login - Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let donor = state
        .repo
        .login(&req.email, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let (token, response) = start_session(&state, &headers, donor).await?;
    info!(donor_id = %response.donor.id, is_admin = response.is_admin, "Donor logged in");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token, state.config.session_max_age))],
        Json(response),
    ))
}

/// POST /auth/logout - Logout and forget the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("No session found".to_string()))?;

    let mut session = state.open_session(&token).await?;
    session.logout().await.map_err(|e| {
        error!("Failed to remove session: {:?}", e);
        ApiError::Port(e)
    })?;

    let cookie = format!("{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /me - The donor of the current session
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current session", body = AuthResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn me_handler(Extension(session): Extension<CurrentSession>) -> ApiResult<Json<AuthResponse>> {
    let donor = session
        .context
        .user()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))?;
    Ok(Json(AuthResponse {
        is_admin: session.context.is_admin(),
        donor,
    }))
}
