use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::Result,
    handlers::{ApiJson, ApiResponse, AppState},
    models::user::{LoginRequest, SignupRequest},
};

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let response = state.auth.signup(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("User registered successfully", response)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let response = state.auth.login(request).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Login successful", response)),
    ))
}
