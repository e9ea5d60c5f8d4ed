// src/services/quote_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        money::{ensure_non_negative, ensure_storable, to_money},
    },
    db::{ClientRepository, QuoteRepository},
    models::quote::{
        NewQuote, NewQuoteItem, PricedItem, Quote, QuoteCharges, QuoteDetail, QuoteItemPatch,
        QuoteListEntry, QuotePatch, QuoteStatus, QuoteTotals,
    },
    services::numbering::{DocumentSeries, NumberingService},
};

// ============================================================================
//  Pricing
// ============================================================================

/// quantity × unit price, two decimal places.
pub fn line_subtotal(quantity: i32, unit_price: Decimal) -> Result<Decimal, AppError> {
    if quantity <= 0 {
        return Err(AppError::Validation("quantity must be a positive integer".into()));
    }
    let unit_price = ensure_non_negative("unitPrice", unit_price)?;

    let subtotal = Decimal::from(quantity)
        .checked_mul(unit_price)
        .map(to_money)
        .ok_or_else(|| AppError::Validation("line amount is too large".into()))?;
    ensure_storable("line amount", subtotal)?;

    Ok(subtotal)
}

pub fn price_item(item: &NewQuoteItem, default_sort_order: i32) -> Result<PricedItem, AppError> {
    let description = item.description.trim();
    if description.is_empty() {
        return Err(AppError::Validation("item description is required".into()));
    }

    Ok(PricedItem {
        description: description.to_string(),
        quantity: item.quantity,
        unit_price: to_money(item.unit_price),
        subtotal: line_subtotal(item.quantity, item.unit_price)?,
        sort_order: item.sort_order.unwrap_or(default_sort_order),
    })
}

fn sort_order_at(position: usize) -> Result<i32, AppError> {
    i32::try_from(position).map_err(|_| AppError::Validation("too many items in one quote".into()))
}

/// Items without an explicit `sortOrder` keep their position in the request.
pub fn price_items(items: &[NewQuoteItem]) -> Result<Vec<PricedItem>, AppError> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| price_item(item, sort_order_at(position)?))
        .collect()
}

/// `total = subtotal - discount + cgst + sgst + igst + shipping`.
/// A negative total is rejected, never clamped.
pub fn compute_totals<I>(line_subtotals: I, charges: &QuoteCharges) -> Result<QuoteTotals, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    let discount = ensure_non_negative("discount", charges.discount)?;
    let cgst = ensure_non_negative("cgst", charges.cgst)?;
    let sgst = ensure_non_negative("sgst", charges.sgst)?;
    let igst = ensure_non_negative("igst", charges.igst)?;
    let shipping_charges = ensure_non_negative("shippingCharges", charges.shipping_charges)?;

    let overflow = || AppError::Validation("quote amount is too large".into());

    let subtotal = line_subtotals
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line))
        .ok_or_else(overflow)?;

    let total = [cgst, sgst, igst, shipping_charges]
        .into_iter()
        .try_fold(subtotal - discount, |acc, charge| acc.checked_add(charge))
        .ok_or_else(overflow)?;

    ensure_storable("subtotal", subtotal)?;
    ensure_storable("total", total)?;

    if total.is_sign_negative() && !total.is_zero() {
        return Err(AppError::Validation(format!(
            "discount of {discount} exceeds the quote amount; total cannot be negative"
        )));
    }

    Ok(QuoteTotals {
        subtotal: to_money(subtotal),
        discount,
        cgst,
        sgst,
        igst,
        shipping_charges,
        total: to_money(total),
    })
}

fn ensure_editable(quote: &Quote) -> Result<(), AppError> {
    if !quote.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Quote {} is {} and can no longer be edited",
            quote.quote_number,
            quote.status.as_str()
        )));
    }
    Ok(())
}

fn ensure_transition(quote: &Quote, next: QuoteStatus) -> Result<(), AppError> {
    if next == QuoteStatus::Invoiced {
        return Err(AppError::Conflict(
            "Quotes become invoiced only through conversion to an invoice".into(),
        ));
    }
    if !quote.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move quote {} from {} to {}",
            quote.quote_number,
            quote.status.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

// ============================================================================
//  Service
// ============================================================================

#[derive(Clone)]
pub struct QuoteService {
    repo: QuoteRepository,
    client_repo: ClientRepository,
    numbering: NumberingService,
}

impl QuoteService {
    pub fn new(repo: QuoteRepository, client_repo: ClientRepository, numbering: NumberingService) -> Self {
        Self { repo, client_repo, numbering }
    }

    /// Quote header, number and items are written in one transaction.
    pub async fn create_quote<'e, E>(
        &self,
        executor: E,
        input: NewQuote,
        created_by: Uuid,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        input.validate()?;

        let items = price_items(&input.items)?;
        let totals = compute_totals(items.iter().map(|i| i.subtotal), &input.charges)?;
        let quote_date = input.quote_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = executor.begin().await?;

        if !self.client_repo.exists(&mut *tx, input.client_id).await? {
            return Err(AppError::NotFound("Client".into()));
        }

        let quote_number = self.numbering.issue(&mut tx, DocumentSeries::Quote).await?;

        let quote = self
            .repo
            .insert_quote(
                &mut *tx,
                &quote_number,
                input.client_id,
                quote_date,
                input.valid_until,
                &totals,
                input.notes.as_deref(),
                input.terms.as_deref(),
                created_by,
            )
            .await?;

        for item in &items {
            self.repo.insert_item(&mut *tx, quote.id, item).await?;
        }

        let detail = self.load_detail(&mut tx, quote.id).await?;
        tx.commit().await?;

        tracing::info!(
            quote_id = %quote.id,
            quote_number = %quote.quote_number,
            total = %quote.total,
            items = items.len(),
            "Quote created"
        );
        Ok(detail)
    }

    pub async fn get_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        self.load_detail(&mut conn, id).await
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
        self.repo.list_quotes(executor, status, client_id).await
    }

    /// Partial update. Content changes need an editable quote; a `status` in
    /// the patch is applied last and follows the normal transition rules.
    pub async fn update_quote<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: QuotePatch,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        patch.validate()?;

        let mut tx = executor.begin().await?;

        let mut quote = self
            .repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;

        if patch.touches_content() {
            ensure_editable(&quote)?;

            if let Some(client_id) = patch.client_id {
                if !self.client_repo.exists(&mut *tx, client_id).await? {
                    return Err(AppError::NotFound("Client".into()));
                }
            }

            quote = self
                .repo
                .update_header(
                    &mut *tx,
                    id,
                    patch.client_id,
                    patch.quote_date,
                    patch.valid_until,
                    patch.notes.as_deref(),
                    patch.terms.as_deref(),
                )
                .await?;
        }

        if patch.touches_amounts() {
            let charges = QuoteCharges::from(&quote).merged_with(&patch);

            let line_subtotals: Vec<Decimal> = match &patch.items {
                Some(new_items) => {
                    if new_items.is_empty() {
                        return Err(AppError::Validation("a quote needs at least one item".into()));
                    }
                    let priced = price_items(new_items)?;
                    self.repo.delete_items(&mut *tx, id).await?;
                    for item in &priced {
                        self.repo.insert_item(&mut *tx, id, item).await?;
                    }
                    priced.iter().map(|i| i.subtotal).collect()
                }
                None => self
                    .repo
                    .list_items(&mut *tx, id)
                    .await?
                    .iter()
                    .map(|i| i.subtotal)
                    .collect(),
            };

            let totals = compute_totals(line_subtotals, &charges)?;
            quote = self.repo.update_amounts(&mut *tx, id, &totals).await?;
        }

        if let Some(next) = patch.status {
            if next != quote.status {
                ensure_transition(&quote, next)?;
                self.repo.update_status(&mut *tx, id, next).await?;
            }
        }

        let detail = self.load_detail(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(quote_id = %id, status = detail.quote.status.as_str(), "Quote updated");
        Ok(detail)
    }

    pub async fn transition_quote<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        next: QuoteStatus,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;

        ensure_transition(&quote, next)?;
        let updated = self.repo.update_status(&mut *tx, id, next).await?;

        tx.commit().await?;

        tracing::info!(
            quote_id = %id,
            from = quote.status.as_str(),
            to = next.as_str(),
            "Quote status changed"
        );
        Ok(updated)
    }

    // --- ITEMS ---

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        input: NewQuoteItem,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        input.validate()?;

        let mut tx = executor.begin().await?;
        let quote = self.lock_editable(&mut tx, quote_id).await?;

        let default_sort = self.repo.next_sort_order(&mut *tx, quote_id).await?;
        let item = price_item(&input, default_sort)?;
        self.repo.insert_item(&mut *tx, quote_id, &item).await?;

        self.refresh_totals(&mut tx, &quote).await?;
        let detail = self.load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        item_id: Uuid,
        patch: QuoteItemPatch,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        patch.validate()?;

        let mut tx = executor.begin().await?;
        let quote = self.lock_editable(&mut tx, quote_id).await?;

        let current = self
            .repo
            .find_item(&mut *tx, quote_id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote item".into()))?;

        let merged = NewQuoteItem {
            description: patch.description.unwrap_or(current.description),
            quantity: patch.quantity.unwrap_or(current.quantity),
            unit_price: patch.unit_price.unwrap_or(current.unit_price),
            sort_order: Some(patch.sort_order.unwrap_or(current.sort_order)),
        };
        let item = price_item(&merged, current.sort_order)?;
        self.repo.update_item(&mut *tx, item_id, &item).await?;

        self.refresh_totals(&mut tx, &quote).await?;
        let detail = self.load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn remove_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        item_id: Uuid,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let quote = self.lock_editable(&mut tx, quote_id).await?;

        if self.repo.find_item(&mut *tx, quote_id, item_id).await?.is_none() {
            return Err(AppError::NotFound("Quote item".into()));
        }
        if self.repo.list_items(&mut *tx, quote_id).await?.len() <= 1 {
            return Err(AppError::Conflict("A quote needs at least one item".into()));
        }

        self.repo.delete_item(&mut *tx, item_id).await?;

        self.refresh_totals(&mut tx, &quote).await?;
        let detail = self.load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Items go first, then the quote, in the same transaction.
    pub async fn delete_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;

        if quote.status == QuoteStatus::Invoiced {
            return Err(AppError::Conflict(format!(
                "Quote {} has been invoiced and cannot be deleted",
                quote.quote_number
            )));
        }

        let items = self.repo.delete_items(&mut *tx, id).await?;
        self.repo.delete_quote(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(quote_id = %id, quote_number = %quote.quote_number, items, "Quote deleted");
        Ok(())
    }

    // --- Helpers ---

    async fn lock_editable(&self, conn: &mut PgConnection, id: Uuid) -> Result<Quote, AppError> {
        let quote = self
            .repo
            .lock_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;

        ensure_editable(&quote)?;
        Ok(quote)
    }

    /// Recomputes the stored totals from the current items and charges.
    async fn refresh_totals(&self, conn: &mut PgConnection, quote: &Quote) -> Result<Quote, AppError> {
        let items = self.repo.list_items(&mut *conn, quote.id).await?;
        let totals = compute_totals(items.iter().map(|i| i.subtotal), &QuoteCharges::from(quote))?;
        self.repo.update_amounts(&mut *conn, quote.id, &totals).await
    }

    async fn load_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<QuoteDetail, AppError> {
        let entry = self
            .repo
            .find_list_entry(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;
        let items = self.repo.list_items(&mut *conn, id).await?;

        Ok(QuoteDetail {
            quote: entry.quote,
            client_name: entry.client_name,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, unit_price: Decimal) -> NewQuoteItem {
        NewQuoteItem {
            description: "Consulting".into(),
            quantity,
            unit_price,
            sort_order: None,
        }
    }

    #[test]
    fn subtotal_is_quantity_times_unit_price() {
        assert_eq!(line_subtotal(2, dec!(100.00)).unwrap(), dec!(200.00));
        assert_eq!(line_subtotal(3, dec!(0.1)).unwrap().to_string(), "0.30");
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(matches!(line_subtotal(0, dec!(10)), Err(AppError::Validation(_))));
        assert!(matches!(line_subtotal(-1, dec!(10)), Err(AppError::Validation(_))));
    }

    #[test]
    fn items_total_without_charges() {
        let items = price_items(&[item(2, dec!(100.00)), item(1, dec!(50.00))]).unwrap();
        let totals = compute_totals(items.iter().map(|i| i.subtotal), &QuoteCharges::default()).unwrap();
        assert_eq!(totals.subtotal.to_string(), "250.00");
        assert_eq!(totals.total.to_string(), "250.00");
    }

    #[test]
    fn total_applies_discount_taxes_and_shipping() {
        let charges = QuoteCharges {
            discount: dec!(10.00),
            cgst: dec!(22.50),
            sgst: dec!(22.50),
            igst: dec!(0),
            shipping_charges: dec!(15.00),
        };
        let totals = compute_totals([dec!(200.00), dec!(50.00)], &charges).unwrap();
        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.total, dec!(300.00));
        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount + totals.cgst + totals.sgst + totals.igst + totals.shipping_charges
        );
    }

    #[test]
    fn negative_charges_fail_validation() {
        let charges = QuoteCharges { cgst: dec!(-1), ..Default::default() };
        assert!(matches!(compute_totals([dec!(10)], &charges), Err(AppError::Validation(_))));

        let charges = QuoteCharges { discount: dec!(-5), ..Default::default() };
        assert!(matches!(compute_totals([dec!(10)], &charges), Err(AppError::Validation(_))));
    }

    #[test]
    fn discount_larger_than_amount_fails_closed() {
        let charges = QuoteCharges { discount: dec!(300.00), ..Default::default() };
        assert!(matches!(compute_totals([dec!(250.00)], &charges), Err(AppError::Validation(_))));

        // exactly zero is fine
        let charges = QuoteCharges { discount: dec!(250.00), ..Default::default() };
        assert_eq!(compute_totals([dec!(250.00)], &charges).unwrap().total, Decimal::ZERO);
    }

    #[test]
    fn default_sort_order_follows_request_position() {
        let mut pinned = item(1, dec!(5));
        pinned.sort_order = Some(10);
        let items = price_items(&[item(1, dec!(1)), pinned, item(1, dec!(2))]).unwrap();
        let orders: Vec<i32> = items.iter().map(|i| i.sort_order).collect();
        assert_eq!(orders, vec![0, 10, 2]);
    }

    #[test]
    fn sort_position_never_wraps() {
        assert_eq!(sort_order_at(3).unwrap(), 3);
        assert!(matches!(sort_order_at(i32::MAX as usize + 1), Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut blank = item(1, dec!(5));
        blank.description = "   ".into();
        assert!(price_item(&blank, 0).is_err());
    }

    #[test]
    fn amounts_beyond_the_money_column_are_rejected() {
        assert!(matches!(line_subtotal(1, dec!(100000000000.00)), Err(AppError::Validation(_))));
        // each line fits, their sum does not
        assert!(matches!(line_subtotal(2, dec!(6000000000.00)), Err(AppError::Validation(_))));
        assert!(matches!(
            compute_totals([dec!(6000000000.00), dec!(6000000000.00)], &QuoteCharges::default()),
            Err(AppError::Validation(_))
        ));
        let charges = QuoteCharges { shipping_charges: dec!(9999999999.99), ..Default::default() };
        assert!(matches!(compute_totals([dec!(1.00)], &charges), Err(AppError::Validation(_))));
    }

    #[test]
    fn sub_cent_unit_price_is_rejected() {
        assert!(line_subtotal(1, dec!(9.999)).is_err());
    }
}
