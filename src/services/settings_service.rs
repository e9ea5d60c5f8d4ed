// src/services/settings_service.rs

use sqlx::{Executor, Postgres};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{default_value, Setting, UpdateSettingRequest, KNOWN_KEYS},
};

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    /// Stored pairs plus the built-in default of every known key never stored.
    pub async fn list_settings<'e, E>(&self, executor: E) -> Result<Vec<Setting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut settings = self.repo.list_settings(executor).await?;

        for key in KNOWN_KEYS {
            if settings.iter().any(|s| s.key == key) {
                continue;
            }
            if let Some(value) = default_value(key) {
                settings.push(Setting { key: key.to_string(), value: value.to_string(), updated_at: None });
            }
        }

        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    pub async fn get_setting<'e, E>(&self, executor: E, key: &str) -> Result<Setting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if let Some(setting) = self.repo.get_setting(executor, key).await? {
            return Ok(setting);
        }

        default_value(key)
            .map(|value| Setting { key: key.to_string(), value: value.to_string(), updated_at: None })
            .ok_or_else(|| AppError::NotFound(format!("Setting '{key}'")))
    }

    pub async fn update_setting<'e, E>(
        &self,
        executor: E,
        key: &str,
        payload: UpdateSettingRequest,
    ) -> Result<Setting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !KNOWN_KEYS.contains(&key) {
            return Err(AppError::Validation(format!("Unknown setting '{key}'")));
        }
        payload.validate()?;

        let value = payload.value.trim();
        if value.is_empty() {
            return Err(AppError::Validation("value cannot be blank".into()));
        }

        let setting = self.repo.upsert_setting(executor, key, value).await?;

        tracing::info!(key, value, "Setting updated");
        Ok(setting)
    }
}
