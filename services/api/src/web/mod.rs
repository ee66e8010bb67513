pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{ApiError, ApiResult};
use self::rest::ApiDoc;
use self::state::AppState;

pub use middleware::{require_admin, require_auth};

/// Builds the complete application: public, session and admin routes plus
/// the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> ApiResult<Router> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/stats", get(rest::stats_handler))
        .route("/meta", get(rest::meta_handler))
        .route("/donors/search", get(rest::search_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Donor dashboard (any logged-in donor)
    let session_routes = Router::new()
        .route("/me", get(auth::me_handler))
        .route("/me/donated-today", post(dashboard::donated_today_handler))
        .route("/me/availability", post(dashboard::toggle_availability_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin dashboard. Layers run outermost first, so auth precedes the admin check.
    let admin_routes = Router::new()
        .route("/admin/donors", get(admin::list_donors_handler))
        .route(
            "/admin/donors/{id}",
            put(admin::update_donor_handler).delete(admin::delete_donor_handler),
        )
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
