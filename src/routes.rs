use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, transport_request, transporter, AppState};

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    let request_routes = Router::new()
        .route("/create", post(transport_request::create_request))
        .route("/my-requests", get(transport_request::my_requests))
        .route("/update/{id}", put(transport_request::update_request))
        .route("/all", get(transport_request::all_requests))
        .route("/{request_id}/status", put(transport_request::update_status))
        .route(
            "/{request_id}/transporter",
            post(transporter::create_details).get(transporter::details_for_request),
        );

    let transporter_routes = Router::new()
        .route("/all", get(transporter::all_details))
        .route(
            "/{id}",
            put(transporter::update_details).delete(transporter::delete_details),
        )
        .route("/{id}/container", put(transporter::update_container));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .route("/api/admin/users", get(admin::list_users))
        .nest("/api/transport-requests", request_routes)
        .nest("/api/transporter", transporter_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
