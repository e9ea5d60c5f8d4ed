// src/db/counter_repo.rs

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

/// Last issued document number per series (`quote`, `invoice`).
#[derive(Clone, Default)]
pub struct CounterRepository;

impl CounterRepository {
    pub fn new() -> Self {
        Self
    }

    /// Creates the counter row on first use so it can be locked.
    pub async fn ensure_series<'e, E>(&self, executor: E, series: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO document_counters (series) VALUES ($1) ON CONFLICT (series) DO NOTHING")
            .bind(series)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Row lock held until the surrounding transaction ends: a second caller
    /// waits here and then sees the number written by the first.
    pub async fn lock_last_number<'e, E>(&self, executor: E, series: &str) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let last = sqlx::query_scalar::<_, Option<String>>(
            "SELECT last_number FROM document_counters WHERE series = $1 FOR UPDATE",
        )
        .bind(series)
        .fetch_one(executor)
        .await?;

        Ok(last)
    }

    pub async fn store_last_number<'e, E>(&self, executor: E, series: &str, number: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE document_counters SET last_number = $2, updated_at = NOW() WHERE series = $1")
            .bind(series)
            .bind(number)
            .execute(executor)
            .await?;

        Ok(())
    }
}
