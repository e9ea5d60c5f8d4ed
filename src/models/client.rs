// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "Kumar Traders")]
    pub company: Option<String>,
    #[schema(example = "ravi@kumartraders.in")]
    pub email: Option<String>,
    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[schema(example = "29ABCDE1234F1Z5")]
    pub gstin: Option<String>,
    // Set once on creation, never updated
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "invalid e-mail"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[validate(length(equal = 15, message = "GSTIN must have 15 characters"))]
    pub gstin: Option<String>,
}

/// Contact fields only. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub company: Option<String>,
    #[validate(email(message = "invalid e-mail"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[validate(length(equal = 15, message = "GSTIN must have 15 characters"))]
    pub gstin: Option<String>,
}
