// src/handlers/settings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::settings::{Setting, UpdateSettingRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Stored settings and numbering defaults", body = Vec<Setting>)),
    security(("api_jwt" = []))
)]
pub async fn list_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.list_settings(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(settings)))
}

// GET /api/settings/{key}
#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Setting key, e.g. invoicePrefix")),
    responses(
        (status = 200, description = "Setting value", body = Setting),
        (status = 404, description = "Key never stored and without default")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_setting(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state.settings_service.get_setting(&app_state.db_pool, &key).await?;
    Ok((StatusCode::OK, Json(setting)))
}

// PUT /api/settings/{key}
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Setting key, e.g. invoicePrefix")),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Stored value", body = Setting),
        (status = 400, description = "Unknown key or invalid value")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_setting(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state
        .settings_service
        .update_setting(&app_state.db_pool, &key, payload)
        .await?;

    Ok((StatusCode::OK, Json(setting)))
}
