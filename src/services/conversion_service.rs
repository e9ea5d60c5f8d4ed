// src/services/conversion_service.rs

use chrono::{Duration, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InvoiceRepository, QuoteRepository},
    models::{invoice::Invoice, quote::QuoteStatus},
    services::numbering::{DocumentSeries, NumberingService},
};

/// Payment term of a freshly converted invoice.
pub const INVOICE_DUE_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ConversionService {
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    numbering: NumberingService,
}

impl ConversionService {
    pub fn new(quote_repo: QuoteRepository, invoice_repo: InvoiceRepository, numbering: NumberingService) -> Self {
        Self { quote_repo, invoice_repo, numbering }
    }

    /// Turns an approved quote into an unpaid invoice and marks the quote
    /// `invoiced`, both or neither.
    ///
    /// The quote row lock serialises concurrent conversions of the same quote;
    /// the UNIQUE constraint on `invoices.quote_id` backs it up.
    pub async fn convert_to_invoice<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        created_by: Uuid,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Quote must exist
        let quote = self
            .quote_repo
            .lock_by_id(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;

        // 2. At most one invoice per quote
        if let Some(existing) = self.invoice_repo.find_by_quote(&mut *tx, quote_id).await? {
            return Err(AppError::Conflict(format!(
                "Quote {} has already been converted to invoice {}",
                quote.quote_number, existing.invoice_number
            )));
        }

        if quote.status != QuoteStatus::Approved {
            return Err(AppError::Conflict(format!(
                "Only approved quotes can be converted; quote {} is {}",
                quote.quote_number,
                quote.status.as_str()
            )));
        }

        // 3. Invoice number from the invoice series
        let invoice_number = self.numbering.issue(&mut tx, DocumentSeries::Invoice).await?;

        let invoice_date = Utc::now();
        let due_date = invoice_date + Duration::days(INVOICE_DUE_DAYS);

        let invoice = self
            .invoice_repo
            .insert_invoice(
                &mut *tx,
                &invoice_number,
                quote.id,
                quote.client_id,
                invoice_date,
                due_date,
                quote.total,
                created_by,
            )
            .await?;

        // 4. Quote is now terminal
        self.quote_repo
            .update_status(&mut *tx, quote.id, QuoteStatus::Invoiced)
            .await?;

        tx.commit().await?;

        tracing::info!(
            quote_number = %quote.quote_number,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            due_date = %invoice.due_date,
            "Quote converted to invoice"
        );
        Ok(invoice)
    }
}
