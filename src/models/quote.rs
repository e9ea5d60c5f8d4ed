// src/models/quote.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Invoiced,
}

impl QuoteStatus {
    /// One-way progression: draft -> sent -> approved|rejected, approved -> invoiced.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Approved)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
                | (QuoteStatus::Approved, QuoteStatus::Invoiced)
        )
    }

    /// Items and charges can only change before the client answers.
    pub fn is_editable(self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Sent)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Rejected | QuoteStatus::Invoiced)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Invoiced => "invoiced",
        }
    }
}

// --- Entities ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    #[schema(example = "QT-0042")]
    pub quote_number: String,
    pub client_id: Uuid,
    pub status: QuoteStatus,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub quote_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-31")]
    pub valid_until: Option<NaiveDate>,
    #[schema(example = "250.00")]
    pub subtotal: Decimal,
    #[schema(example = "0.00")]
    pub discount: Decimal,
    #[schema(example = "22.50")]
    pub cgst: Decimal,
    #[schema(example = "22.50")]
    pub sgst: Decimal,
    #[schema(example = "0.00")]
    pub igst: Decimal,
    #[schema(example = "15.00")]
    pub shipping_charges: Decimal,
    #[schema(example = "310.00")]
    pub total: Decimal,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    #[schema(example = "Website design")]
    pub description: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "100.00")]
    pub unit_price: Decimal,
    #[schema(example = "200.00")]
    pub subtotal: Decimal,
    #[schema(example = 0)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub client_name: String,
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub quote: Quote,
    pub client_name: String,
}

// --- Inputs ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuoteItem {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Website design")]
    pub description: String,

    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    #[schema(example = 2)]
    pub quantity: i32,

    #[schema(value_type = String, example = "100.00")]
    pub unit_price: Decimal,

    // Defaults to the item position in the request
    pub sort_order: Option<i32>,
}

/// Charges applied on top of the item subtotal. All amounts, not rates.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteCharges {
    #[schema(value_type = String, example = "0.00")]
    pub discount: Decimal,
    #[schema(value_type = String, example = "22.50")]
    pub cgst: Decimal,
    #[schema(value_type = String, example = "22.50")]
    pub sgst: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub igst: Decimal,
    #[schema(value_type = String, example = "15.00")]
    pub shipping_charges: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub client_id: Uuid,

    #[validate(length(min = 1, message = "a quote needs at least one item"), nested)]
    pub items: Vec<NewQuoteItem>,

    #[serde(flatten)]
    pub charges: QuoteCharges,

    // Defaults to today
    #[schema(value_type = Option<String>, format = Date)]
    pub quote_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

/// Partial update. Fields left out keep their stored value; `items`
/// replaces the whole item list.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePatch {
    pub client_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub quote_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub cgst: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub sgst: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub igst: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub shipping_charges: Option<Decimal>,
    #[validate(nested)]
    pub items: Option<Vec<NewQuoteItem>>,
    pub status: Option<QuoteStatus>,
}

impl QuotePatch {
    /// True when the patch changes anything other than the status.
    pub fn touches_content(&self) -> bool {
        self.client_id.is_some()
            || self.quote_date.is_some()
            || self.valid_until.is_some()
            || self.notes.is_some()
            || self.terms.is_some()
            || self.touches_amounts()
    }

    pub fn touches_amounts(&self) -> bool {
        self.discount.is_some()
            || self.cgst.is_some()
            || self.sgst.is_some()
            || self.igst.is_some()
            || self.shipping_charges.is_some()
            || self.items.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemPatch {
    #[validate(length(min = 1, message = "required"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub sort_order: Option<i32>,
}

// --- Computed values ---

/// Validated line item, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub shipping_charges: Decimal,
    pub total: Decimal,
}

impl From<&Quote> for QuoteCharges {
    fn from(quote: &Quote) -> Self {
        Self {
            discount: quote.discount,
            cgst: quote.cgst,
            sgst: quote.sgst,
            igst: quote.igst,
            shipping_charges: quote.shipping_charges,
        }
    }
}

impl QuoteCharges {
    /// Stored charges overridden by whatever the patch carries.
    pub fn merged_with(mut self, patch: &QuotePatch) -> Self {
        if let Some(v) = patch.discount {
            self.discount = v;
        }
        if let Some(v) = patch.cgst {
            self.cgst = v;
        }
        if let Some(v) = patch.sgst {
            self.sgst = v;
        }
        if let Some(v) = patch.igst {
            self.igst = v;
        }
        if let Some(v) = patch.shipping_charges {
            self.shipping_charges = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_overrides_only_given_charges() {
        let stored = QuoteCharges {
            discount: Decimal::new(1000, 2),
            cgst: Decimal::new(900, 2),
            ..Default::default()
        };
        let patch = QuotePatch { cgst: Some(Decimal::new(450, 2)), ..Default::default() };
        let merged = stored.merged_with(&patch);
        assert_eq!(merged.discount, Decimal::new(1000, 2));
        assert_eq!(merged.cgst, Decimal::new(450, 2));
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        use QuoteStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Approved));
        assert!(Sent.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Invoiced));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Sent.can_transition_to(Draft));
        assert!(!Approved.can_transition_to(Sent));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Invoiced.can_transition_to(Approved));
        assert!(!Sent.can_transition_to(Invoiced));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        use QuoteStatus::*;
        for next in [Draft, Sent, Approved, Rejected, Invoiced] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Invoiced.can_transition_to(next));
        }
        assert!(Rejected.is_terminal() && Invoiced.is_terminal());
    }

    #[test]
    fn only_draft_and_sent_are_editable() {
        assert!(QuoteStatus::Draft.is_editable());
        assert!(QuoteStatus::Sent.is_editable());
        assert!(!QuoteStatus::Approved.is_editable());
        assert!(!QuoteStatus::Invoiced.is_editable());
    }

    #[test]
    fn status_only_patch_does_not_touch_content() {
        let patch = QuotePatch { status: Some(QuoteStatus::Sent), ..Default::default() };
        assert!(!patch.touches_content());

        let patch = QuotePatch { notes: Some("net 15".into()), ..Default::default() };
        assert!(patch.touches_content());
        assert!(!patch.touches_amounts());
    }

    #[test]
    fn charges_deserialize_from_decimal_strings() {
        let json = r#"{"clientId":"6f1c2d4e-8a8b-4c55-9a61-1b7c1f0f9a10","items":[{"description":"Design","quantity":2,"unitPrice":"100.00"}],"discount":"10.00","cgst":"9.00"}"#;
        let quote: NewQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.charges.discount.to_string(), "10.00");
        assert_eq!(quote.charges.cgst.to_string(), "9.00");
        assert!(quote.charges.igst.is_zero());
        assert_eq!(quote.items[0].quantity, 2);
    }

    #[test]
    fn nested_item_errors_fail_the_quote() {
        let json = r#"{"clientId":"6f1c2d4e-8a8b-4c55-9a61-1b7c1f0f9a10","items":[{"description":"","quantity":0,"unitPrice":"1.00"}]}"#;
        let quote: NewQuote = serde_json::from_str(json).unwrap();
        assert!(quote.validate().is_err());

        let empty = NewQuote { items: vec![], ..quote };
        assert!(empty.validate().is_err());
    }
}
