// src/services/dashboard_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{DashboardSummary, MonthlyRevenueEntry, TopClientEntry},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.repo.get_summary(executor).await
    }

    pub async fn get_monthly_revenue<'e, E>(&self, executor: E) -> Result<Vec<MonthlyRevenueEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_monthly_revenue(executor).await
    }

    pub async fn get_top_clients<'e, E>(&self, executor: E) -> Result<Vec<TopClientEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_top_clients(executor).await
    }
}
