use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::Result,
    handlers::{AdminUser, ApiJson, ApiPath, ApiResponse, AppState, AuthUser},
    models::transporter::{ContainerFields, TransporterFields},
};

pub async fn create_details(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(request_id): ApiPath<i64>,
    ApiJson(fields): ApiJson<TransporterFields>,
) -> Result<impl IntoResponse> {
    let details = state
        .transporters
        .create_transporter_details(request_id, fields)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Transporter details saved successfully",
            details,
        )),
    ))
}

pub async fn details_for_request(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(request_id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    let details = state.transporters.get_by_request_id(request_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(details))))
}

pub async fn all_details(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse> {
    let details = state.transporters.list_all().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(details))))
}

pub async fn update_details(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<TransporterFields>,
) -> Result<impl IntoResponse> {
    let details = state.transporters.update_transporter_details(id, fields).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Transporter details updated successfully",
            details,
        )),
    ))
}

pub async fn update_container(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(containers): ApiJson<ContainerFields>,
) -> Result<impl IntoResponse> {
    let details = state.transporters.update_container_fields(id, containers).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Container details updated successfully",
            details,
        )),
    ))
}

pub async fn delete_details(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    state.transporters.delete(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Transporter details deleted successfully",
            serde_json::json!({ "id": id }),
        )),
    ))
}
