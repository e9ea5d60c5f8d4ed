// src/models/payment.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, models::invoice::Invoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    DebitCard,
    Check,
    Cash,
    Upi,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 7] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Check,
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Check => "check",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown payment method '{s}'")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[schema(example = "100.00")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[schema(example = "UTR123456789")]
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub payment_date: NaiveDate,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Method arrives as free text so an unknown value is a validation error
/// rather than a JSON rejection.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    #[schema(value_type = String, example = "100.00")]
    pub amount: Decimal,
    #[schema(example = "upi")]
    pub payment_method: String,
    // Defaults to today
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    #[validate(length(max = 120, message = "transaction reference too long"))]
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPayment {
    pub payment: PaymentHistoryEntry,
    pub invoice: Invoice,
    // Amount paid beyond the invoice total, if any. Accepted, only reported.
    #[schema(value_type = Option<String>)]
    pub overpayment: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_round_trips_through_its_name() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn unknown_method_is_a_validation_error() {
        assert!(matches!("paypal".parse::<PaymentMethod>(), Err(AppError::Validation(_))));
        assert!(matches!("UPI".parse::<PaymentMethod>(), Err(AppError::Validation(_))));
    }
}
