//! services/api/src/web/admin.rs
//!
//! Administrator endpoints: list and filter every donor, edit a record in
//! full, delete a record. Routed behind `require_auth` and `require_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bloodreach_core::Donor;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    /// Matches name or district (case-insensitive) or phone.
    pub q: Option<String>,
}

/// GET /admin/donors - Every donor, optionally filtered
#[utoipa::path(
    get,
    path = "/admin/donors",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Donor records", body = [Donor]),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_donors_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminListQuery>,
) -> ApiResult<Json<Vec<Donor>>> {
    let donors = match query.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.repo.filter_for_admin(term).await?,
        _ => state.repo.get_all().await?,
    };
    Ok(Json(donors))
}

/// PUT /admin/donors/{id} - Replace a donor record
#[utoipa::path(
    put,
    path = "/admin/donors/{id}",
    params(("id" = String, Path, description = "Donor id")),
    request_body = Donor,
    responses(
        (status = 200, description = "Donor updated", body = Donor),
        (status = 400, description = "Body id does not match the path"),
        (status = 404, description = "No donor with this id"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn update_donor_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(donor): Json<Donor>,
) -> ApiResult<Json<Donor>> {
    if donor.id != id {
        return Err(ApiError::BadRequest(format!(
            "Body id '{}' does not match path id '{}'",
            donor.id, id
        )));
    }
    if !state.repo.update(&donor).await? {
        return Err(ApiError::NotFound(format!("Donor {} not found", id)));
    }
    info!(donor_id = %id, "Donor edited by admin");
    Ok(Json(donor))
}

/// DELETE /admin/donors/{id} - Delete a donor record
#[utoipa::path(
    delete,
    path = "/admin/donors/{id}",
    params(("id" = String, Path, description = "Donor id")),
    responses(
        (status = 204, description = "Donor deleted, or never existed"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn delete_donor_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
