// src/services/client_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::client::{Client, ClientPatch, NewClient},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        input: NewClient,
        created_by: Uuid,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        input.validate()?;
        let client = self.repo.create_client(executor, &input, created_by).await?;

        tracing::info!(client_id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    pub async fn list_clients<'e, E>(&self, executor: E, search: Option<&str>) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.list_clients(executor, search).await
    }

    pub async fn get_client<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client".into()))
    }

    pub async fn update_client<'e, E>(&self, executor: E, id: Uuid, patch: ClientPatch) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_client(executor, id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Client".into()))
    }

    /// Clients with quotes are kept: their documents still point at them.
    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quotes = self.repo.count_quotes(&mut *tx, id).await?;
        if quotes > 0 {
            return Err(AppError::Conflict(format!(
                "Client is referenced by {quotes} quote(s) and cannot be deleted"
            )));
        }

        if self.repo.delete_client(&mut *tx, id).await? == 0 {
            return Err(AppError::NotFound("Client".into()));
        }

        tx.commit().await?;

        tracing::info!(client_id = %id, "Client deleted");
        Ok(())
    }
}
