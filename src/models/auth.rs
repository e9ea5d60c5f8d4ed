// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "owner@acme.in")]
    pub email: String,
    #[schema(example = "Asha Rao")]
    pub full_name: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "The e-mail provided is invalid."))]
    #[schema(example = "owner@acme.in")]
    pub email: String,
    #[validate(length(min = 6, message = "The password must be at least 6 characters long."))]
    #[schema(example = "s3cr3t!")]
    pub password: String,
    #[schema(example = "Asha Rao")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "The e-mail provided is invalid."))]
    #[schema(example = "owner@acme.in")]
    pub email: String,
    #[validate(length(min = 6, message = "The password must be at least 6 characters long."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Claims carried inside the JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user id
    pub exp: usize, // expiration
    pub iat: usize, // issued at
}
