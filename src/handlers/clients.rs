// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::client::{Client, ClientPatch, NewClient},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientListQuery {
    /// Matches name, company or e-mail
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<NewClient>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .client_service
        .create_client(&app_state.db_pool, payload, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientListQuery),
    responses((status = 200, description = "Clients ordered by name", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state
        .client_service
        .list_clients(&app_state.db_pool, query.search.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(clients)))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Client not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get_client(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(client)))
}

#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = ClientPatch,
    responses(
        (status = 200, description = "Updated client", body = Client),
        (status = 404, description = "Client not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPatch>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .client_service
        .update_client(&app_state.db_pool, id, payload)
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client still has quotes")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete_client(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
