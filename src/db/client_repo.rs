// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_violation, AppError},
    models::client::{Client, ClientPatch, NewClient},
};

const CLIENT_COLUMNS: &str = "id, name, company, email, phone, address, city, state, postal_code, \
                              country, gstin, created_by, created_at, updated_at";

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        input: &NewClient,
        created_by: Uuid,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (
                name, company, email, phone, address, city, state, postal_code, country, gstin, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(&input.name)
            .bind(&input.company)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.postal_code)
            .bind(&input.country)
            .bind(&input.gstin)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    pub async fn list_clients<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE $1::text IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR company ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
            ORDER BY name ASC
            "#
        );

        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(search)
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    /// COALESCE keeps the stored value for every field the patch leaves out.
    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &ClientPatch,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients SET
                name        = COALESCE($2, name),
                company     = COALESCE($3, company),
                email       = COALESCE($4, email),
                phone       = COALESCE($5, phone),
                address     = COALESCE($6, address),
                city        = COALESCE($7, city),
                state       = COALESCE($8, state),
                postal_code = COALESCE($9, postal_code),
                country     = COALESCE($10, country),
                gstin       = COALESCE($11, gstin),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.company)
            .bind(&patch.email)
            .bind(&patch.phone)
            .bind(&patch.address)
            .bind(&patch.city)
            .bind(&patch.state)
            .bind(&patch.postal_code)
            .bind(&patch.country)
            .bind(&patch.gstin)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    pub async fn count_quotes<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes WHERE client_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Returns the number of deleted rows. The foreign key from `quotes`
    /// still guards against a quote created after the caller's check.
    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_violation(e, "Client is referenced by existing quotes"))?;

        Ok(result.rows_affected())
    }
}
