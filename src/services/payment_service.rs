// src/services/payment_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        money::{ensure_positive, ensure_storable},
    },
    db::{InvoiceRepository, PaymentRepository},
    models::{
        invoice::{Invoice, PaymentStatus},
        payment::{NewPayment, PaymentHistoryEntry, PaymentMethod, RecordedPayment},
    },
};

/// Collection state of an invoice, from its inputs only.
///
/// `paid` once the total is covered, `partial` for anything in between,
/// `pending` while nothing was paid. Unpaid and partially paid invoices
/// past their due date are `overdue`.
pub fn derive_status(
    paid_amount: Decimal,
    total: Decimal,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PaymentStatus {
    let status = if paid_amount <= Decimal::ZERO {
        PaymentStatus::Pending
    } else if paid_amount >= total {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    };

    if status != PaymentStatus::Paid && now > due_date {
        PaymentStatus::Overdue
    } else {
        status
    }
}

#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
    invoice_repo: InvoiceRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository, invoice_repo: InvoiceRepository) -> Self {
        Self { repo, invoice_repo }
    }

    /// Over-payments are accepted and reported back in `overpayment`.
    pub async fn record_payment<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
        input: NewPayment,
        recorded_by: Uuid,
    ) -> Result<RecordedPayment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        input.validate()?;
        let amount = ensure_positive("amount", input.amount)?;
        let method: PaymentMethod = input.payment_method.trim().parse()?;
        let payment_date = input.payment_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = executor.begin().await?;

        // Payments on the same invoice queue up here
        let invoice = self
            .invoice_repo
            .lock_by_id(&mut *tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice".into()))?;

        // Over-payment is allowed, but the running total must still fit its column
        let paid_after = invoice
            .paid_amount
            .checked_add(amount)
            .ok_or_else(|| AppError::Validation("paid amount is too large".into()))?;
        ensure_storable("paid amount", paid_after)?;

        let payment = self
            .repo
            .insert_payment(
                &mut *tx,
                invoice.id,
                amount,
                method,
                input.transaction_id.as_deref(),
                input.notes.as_deref(),
                payment_date,
                recorded_by,
            )
            .await?;

        let invoice = self.reconcile(&mut tx, &invoice).await?;
        tx.commit().await?;

        let overpayment = Some(invoice.paid_amount - invoice.total).filter(|excess| *excess > Decimal::ZERO);
        if let Some(excess) = overpayment {
            tracing::warn!(
                invoice_number = %invoice.invoice_number,
                total = %invoice.total,
                paid_amount = %invoice.paid_amount,
                %excess,
                "Invoice is over-paid"
            );
        }

        tracing::info!(
            invoice_number = %invoice.invoice_number,
            amount = %payment.amount,
            method = method.as_str(),
            status = ?invoice.payment_status,
            "Payment recorded"
        );

        Ok(RecordedPayment { payment, invoice, overpayment })
    }

    /// Removes a payment entry; the invoice status may move back down.
    pub async fn delete_payment<'e, E>(&self, executor: E, payment_id: Uuid) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = self
            .repo
            .find_by_id(&mut *tx, payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment".into()))?;

        let invoice = self
            .invoice_repo
            .lock_by_id(&mut *tx, payment.invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice".into()))?;

        // Someone else may have removed it while we waited for the lock
        if self.repo.delete_payment(&mut *tx, payment_id).await? == 0 {
            return Err(AppError::NotFound("Payment".into()));
        }

        let invoice = self.reconcile(&mut tx, &invoice).await?;
        tx.commit().await?;

        tracing::info!(
            invoice_number = %invoice.invoice_number,
            amount = %payment.amount,
            status = ?invoice.payment_status,
            "Payment deleted"
        );
        Ok(invoice)
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
    ) -> Result<Vec<PaymentHistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        if self.invoice_repo.find_by_id(&mut *conn, invoice_id).await?.is_none() {
            return Err(AppError::NotFound("Invoice".into()));
        }

        self.repo.list_for_invoice(&mut *conn, invoice_id).await
    }

    /// Paid amount is always the sum of the stored entries, never a running delta.
    async fn reconcile(&self, conn: &mut PgConnection, invoice: &Invoice) -> Result<Invoice, AppError> {
        let paid_amount = self.repo.sum_for_invoice(&mut *conn, invoice.id).await?;
        let status = derive_status(paid_amount, invoice.total, invoice.due_date, Utc::now());

        self.invoice_repo
            .update_payment_state(&mut *conn, invoice.id, paid_amount, status)
            .await
    }
}
