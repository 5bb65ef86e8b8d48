use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::Result,
    handlers::{AdminUser, ApiResponse, AppState},
};

/// Get all users handler
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse> {
    let users = state.auth.list_users().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(users))))
}
