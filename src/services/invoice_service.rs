// src/services/invoice_service.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InvoiceRepository, PaymentRepository},
    models::invoice::{InvoiceDetail, InvoiceListEntry, PaymentStatus},
    services::payment_service::derive_status,
};

#[derive(Clone)]
pub struct InvoiceService {
    repo: InvoiceRepository,
    payment_repo: PaymentRepository,
}

impl InvoiceService {
    pub fn new(repo: InvoiceRepository, payment_repo: PaymentRepository) -> Self {
        Self { repo, payment_repo }
    }

    pub async fn get_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let entry = self
            .repo
            .find_list_entry(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice".into()))?;
        let payments = self.payment_repo.list_for_invoice(&mut *conn, id).await?;

        Ok(InvoiceDetail {
            balance_due: entry.invoice.balance_due(),
            invoice: entry.invoice,
            quote_number: entry.quote_number,
            client_name: entry.client_name,
            payments,
        })
    }

    pub async fn list_invoices<'e, E>(
        &self,
        executor: E,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<InvoiceListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_invoices(executor, status).await
    }

    /// Re-derives the status of every unpaid invoice whose due date is behind
    /// `now`. Returns how many invoices changed.
    pub async fn sweep_overdue<'e, E>(&self, executor: E, now: DateTime<Utc>) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let candidates = self.repo.lock_past_due(&mut *tx, now).await?;
        let mut updated = 0;

        for invoice in candidates {
            let status = derive_status(invoice.paid_amount, invoice.total, invoice.due_date, now);
            if status == invoice.payment_status {
                continue;
            }

            self.repo
                .update_payment_state(&mut *tx, invoice.id, invoice.paid_amount, status)
                .await?;
            updated += 1;

            tracing::debug!(invoice_number = %invoice.invoice_number, status = ?status, "Invoice status swept");
        }

        tx.commit().await?;

        if updated > 0 {
            tracing::info!(updated, "Overdue sweep finished");
        }
        Ok(updated)
    }
}
