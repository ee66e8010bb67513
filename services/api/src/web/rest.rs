//! services/api/src/web/rest.rs
//!
//! Contains the public REST handlers (landing stats, form metadata, donor
//! search) and the master definition for the OpenAPI specification.

use crate::error::ApiResult;
use crate::web::state::AppState;
use crate::web::{admin, auth, dashboard};
use axum::{
    extract::{Query, State},
    response::Json,
};
use bloodreach_core::domain::{optional_date, BloodGroup, District, Donor, Gender, Stats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        stats_handler,
        meta_handler,
        search_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        dashboard::donated_today_handler,
        dashboard::toggle_availability_handler,
        admin::list_donors_handler,
        admin::update_donor_handler,
        admin::delete_donor_handler,
    ),
    components(
        schemas(
            StatsResponse,
            MetaResponse,
            LabeledOption,
            DonorListing,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            Donor,
            BloodGroup,
            District,
            Gender,
            bloodreach_core::Role,
        )
    ),
    tags(
        (name = "BloodReach API", description = "Blood donor directory: search, registration and administration.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_donors: u64,
    pub lives_saved: u64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            total_donors: stats.total_donors,
            lives_saved: stats.lives_saved,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LabeledOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// The closed enumerations a registration or search form offers.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub blood_groups: Vec<&'static str>,
    pub districts: Vec<LabeledOption>,
    pub genders: Vec<LabeledOption>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// One of A+, A-, B+, B-, AB+, AB-, O+, O-.
    pub blood_group: BloodGroup,
    pub district: District,
}

/// A search hit as shown to seekers. Credentials and role are left out.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorListing {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub district: District,
    pub gender: Gender,
    #[serde(with = "optional_date")]
    #[schema(value_type = String, format = Date)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
}

impl From<Donor> for DonorListing {
    fn from(donor: Donor) -> Self {
        Self {
            id: donor.id,
            name: donor.name,
            phone: donor.phone,
            blood_group: donor.blood_group,
            district: donor.district,
            gender: donor.gender,
            last_donation_date: donor.last_donation_date,
            institute: donor.institute,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Landing-page counters.
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Donor counters", body = StatsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.repo.get_stats().await?;
    Ok(Json(stats.into()))
}

/// Blood groups, districts and genders with their display labels.
#[utoipa::path(
    get,
    path = "/meta",
    responses(
        (status = 200, description = "Form options", body = MetaResponse)
    )
)]
pub async fn meta_handler() -> Json<MetaResponse> {
    Json(MetaResponse {
        blood_groups: BloodGroup::ALL.iter().map(BloodGroup::as_str).collect(),
        districts: District::ALL
            .iter()
            .map(|district| LabeledOption {
                value: district.as_str(),
                label: district.label(),
            })
            .collect(),
        genders: Gender::ALL
            .iter()
            .map(|gender| LabeledOption {
                value: gender.as_str(),
                label: gender.label(),
            })
            .collect(),
    })
}

/// Find available donors of a blood group in a district who are out of cooldown.
#[utoipa::path(
    get,
    path = "/donors/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Eligible donors", body = [DonorListing]),
        (status = 400, description = "Unknown blood group or district"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<DonorListing>>> {
    let donors = state.repo.search(query.blood_group, query.district).await?;
    Ok(Json(donors.into_iter().map(DonorListing::from).collect()))
}
