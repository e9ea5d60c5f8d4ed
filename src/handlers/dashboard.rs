// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardSummary, MonthlyRevenueEntry, TopClientEntry},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Quote pipeline and collection figures", body = DashboardSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/revenue
#[utoipa::path(
    get,
    path = "/api/dashboard/revenue",
    tag = "Dashboard",
    responses((status = 200, description = "Collected amount per month, last 12 months", body = Vec<MonthlyRevenueEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_revenue(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let revenue = app_state.dashboard_service.get_monthly_revenue(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(revenue)))
}

// GET /api/dashboard/top-clients
#[utoipa::path(
    get,
    path = "/api/dashboard/top-clients",
    tag = "Dashboard",
    responses((status = 200, description = "Top 5 clients by collected revenue", body = Vec<TopClientEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_top_clients(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.dashboard_service.get_top_clients(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(clients)))
}
