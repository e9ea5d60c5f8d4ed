// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::settings::Setting};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_setting<'e, E>(&self, executor: E, key: &str) -> Result<Option<Setting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(executor)
        .await?;

        Ok(setting)
    }

    pub async fn list_settings<'e, E>(&self, executor: E) -> Result<Vec<Setting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings ORDER BY key ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(settings)
    }

    // UPSERT (insert or update)
    pub async fn upsert_setting<'e, E>(&self, executor: E, key: &str, value: &str) -> Result<Setting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(executor)
        .await?;

        Ok(setting)
    }
}
