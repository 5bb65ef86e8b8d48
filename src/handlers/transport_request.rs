use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::Result,
    handlers::{AdminUser, ApiJson, ApiPath, ApiResponse, AppState, AuthUser},
    models::transport_request::{RequestFields, StatusChange},
};

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(fields): ApiJson<RequestFields>,
) -> Result<impl IntoResponse> {
    let request = state.requests.create_request(user.id, fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Transport request created successfully",
            request,
        )),
    ))
}

pub async fn my_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let requests = state.requests.list_own_requests(user.id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(requests))))
}

pub async fn update_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<RequestFields>,
) -> Result<impl IntoResponse> {
    let request = state.requests.update_request(id, user.id, fields).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Transport request updated successfully",
            request,
        )),
    ))
}

pub async fn all_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse> {
    let requests = state.requests.list_all_requests().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(requests))))
}

pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(request_id): ApiPath<i64>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<impl IntoResponse> {
    let request = state
        .requests
        .transition_status(
            request_id,
            change.status.as_deref().unwrap_or_default(),
            change.admin_comment.as_deref(),
        )
        .await?;

    tracing::debug!("Admin {} decided transport request {}", admin.id, request_id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Request status updated successfully",
            request,
        )),
    ))
}
