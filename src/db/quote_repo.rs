// src/db/quote_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_violation, AppError},
    models::quote::{PricedItem, Quote, QuoteItem, QuoteListEntry, QuoteStatus, QuoteTotals},
};

// Always selected through the `q` alias so the same list works in joins.
const QUOTE_COLUMNS: &str = "q.id, q.quote_number, q.client_id, q.status, q.quote_date, q.valid_until, \
                             q.subtotal, q.discount, q.cgst, q.sgst, q.igst, q.shipping_charges, q.total, \
                             q.notes, q.terms, q.created_by, q.created_at, q.updated_at";

const ITEM_COLUMNS: &str =
    "qi.id, qi.quote_id, qi.description, qi.quantity, qi.unit_price, qi.subtotal, qi.sort_order, qi.created_at";

#[derive(Clone, Default)]
pub struct QuoteRepository;

impl QuoteRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  QUOTES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_quote<'e, E>(
        &self,
        executor: E,
        quote_number: &str,
        client_id: Uuid,
        quote_date: NaiveDate,
        valid_until: Option<NaiveDate>,
        totals: &QuoteTotals,
        notes: Option<&str>,
        terms: Option<&str>,
        created_by: Uuid,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quotes AS q (
                quote_number, client_id, status, quote_date, valid_until,
                subtotal, discount, cgst, sgst, igst, shipping_charges, total,
                notes, terms, created_by
            )
            VALUES ($1, $2, 'draft', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Quote>(&sql)
            .bind(quote_number)
            .bind(client_id)
            .bind(quote_date)
            .bind(valid_until)
            .bind(totals.subtotal)
            .bind(totals.discount)
            .bind(totals.cgst)
            .bind(totals.sgst)
            .bind(totals.igst)
            .bind(totals.shipping_charges)
            .bind(totals.total)
            .bind(notes)
            .bind(terms)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_violation(e, "Quote number already issued"))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes q WHERE q.id = $1");
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    /// Same as `find_by_id` but holds a row lock until the transaction ends.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes q WHERE q.id = $1 FOR UPDATE");
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn find_list_entry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<QuoteListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {QUOTE_COLUMNS}, c.name AS client_name
            FROM quotes q
            JOIN clients c ON c.id = q.client_id
            WHERE q.id = $1
            "#
        );
        let entry = sqlx::query_as::<_, QuoteListEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    pub async fn list_quotes<'e, E>(
        &self,
        executor: E,
        status: Option<QuoteStatus>,
        client_id: Option<Uuid>,
    ) -> Result<Vec<QuoteListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {QUOTE_COLUMNS}, c.name AS client_name
            FROM quotes q
            JOIN clients c ON c.id = q.client_id
            WHERE ($1::quote_status IS NULL OR q.status = $1)
              AND ($2::uuid IS NULL OR q.client_id = $2)
            ORDER BY q.created_at DESC, q.quote_number DESC
            "#
        );
        let quotes = sqlx::query_as::<_, QuoteListEntry>(&sql)
            .bind(status)
            .bind(client_id)
            .fetch_all(executor)
            .await?;

        Ok(quotes)
    }

    pub async fn update_header<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_id: Option<Uuid>,
        quote_date: Option<NaiveDate>,
        valid_until: Option<NaiveDate>,
        notes: Option<&str>,
        terms: Option<&str>,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes q SET
                client_id   = COALESCE($2, q.client_id),
                quote_date  = COALESCE($3, q.quote_date),
                valid_until = COALESCE($4, q.valid_until),
                notes       = COALESCE($5, q.notes),
                terms       = COALESCE($6, q.terms),
                updated_at  = NOW()
            WHERE q.id = $1
            RETURNING {QUOTE_COLUMNS}
            "#
        );
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(client_id)
            .bind(quote_date)
            .bind(valid_until)
            .bind(notes)
            .bind(terms)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    pub async fn update_amounts<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        totals: &QuoteTotals,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes q SET
                subtotal = $2, discount = $3, cgst = $4, sgst = $5, igst = $6,
                shipping_charges = $7, total = $8, updated_at = NOW()
            WHERE q.id = $1
            RETURNING {QUOTE_COLUMNS}
            "#
        );
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(totals.subtotal)
            .bind(totals.discount)
            .bind(totals.cgst)
            .bind(totals.sgst)
            .bind(totals.igst)
            .bind(totals.shipping_charges)
            .bind(totals.total)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: QuoteStatus,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE quotes q SET status = $2, updated_at = NOW() WHERE q.id = $1 RETURNING {QUOTE_COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(status)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    pub async fn delete_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_violation(e, "Quote is referenced by an invoice"))?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ITEMS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        item: &PricedItem,
    ) -> Result<QuoteItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quote_items AS qi (quote_id, description, quantity, unit_price, subtotal, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, QuoteItem>(&sql)
            .bind(quote_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(item.sort_order)
            .fetch_one(executor)
            .await?;

        Ok(item)
    }

    /// Render order: `sort_order`, then insertion order.
    pub async fn list_items<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<QuoteItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM quote_items qi WHERE qi.quote_id = $1 ORDER BY qi.sort_order ASC, qi.seq ASC"
        );
        let items = sqlx::query_as::<_, QuoteItem>(&sql)
            .bind(quote_id)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<QuoteItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM quote_items qi WHERE qi.quote_id = $1 AND qi.id = $2");
        let item = sqlx::query_as::<_, QuoteItem>(&sql)
            .bind(quote_id)
            .bind(item_id)
            .fetch_optional(executor)
            .await?;

        Ok(item)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        item: &PricedItem,
    ) -> Result<QuoteItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quote_items qi SET
                description = $2, quantity = $3, unit_price = $4, subtotal = $5, sort_order = $6
            WHERE qi.id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, QuoteItem>(&sql)
            .bind(item_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(item.sort_order)
            .fetch_one(executor)
            .await?;

        Ok(item)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quote_items WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_items<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn next_sort_order<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM quote_items WHERE quote_id = $1",
        )
        .bind(quote_id)
        .fetch_one(executor)
        .await?;

        Ok(next)
    }
}
