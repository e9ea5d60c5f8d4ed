// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- Known keys ---

pub const QUOTE_PREFIX: &str = "quotePrefix";
pub const INVOICE_PREFIX: &str = "invoicePrefix";
pub const COMPANY_NAME: &str = "companyName";
pub const COMPANY_ADDRESS: &str = "companyAddress";
pub const COMPANY_GSTIN: &str = "companyGstin";
pub const UPI_ID: &str = "upiId";

pub const KNOWN_KEYS: [&str; 6] = [
    QUOTE_PREFIX,
    INVOICE_PREFIX,
    COMPANY_NAME,
    COMPANY_ADDRESS,
    COMPANY_GSTIN,
    UPI_ID,
];

pub const DEFAULT_QUOTE_PREFIX: &str = "QT";
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Value used when a key was never stored.
pub fn default_value(key: &str) -> Option<&'static str> {
    match key {
        QUOTE_PREFIX => Some(DEFAULT_QUOTE_PREFIX),
        INVOICE_PREFIX => Some(DEFAULT_INVOICE_PREFIX),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[schema(example = "invoicePrefix")]
    pub key: String,
    #[schema(example = "INV")]
    pub value: String,
    // None when the value is a built-in default
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
    #[validate(length(min = 1, max = 200, message = "value must have 1 to 200 characters"))]
    #[schema(example = "ACME")]
    pub value: String,
}

/// Company block printed on quote and invoice PDFs.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub upi_id: Option<String>,
}

impl CompanyProfile {
    pub fn from_settings(settings: &[Setting]) -> Self {
        let lookup = |key: &str| {
            settings
                .iter()
                .find(|s| s.key == key)
                .map(|s| s.value.clone())
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            name: lookup(COMPANY_NAME),
            address: lookup(COMPANY_ADDRESS),
            gstin: lookup(COMPANY_GSTIN),
            upi_id: lookup(UPI_ID),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_prefixes_have_defaults() {
        assert_eq!(default_value(QUOTE_PREFIX), Some("QT"));
        assert_eq!(default_value(INVOICE_PREFIX), Some("INV"));
        assert_eq!(default_value(UPI_ID), None);
    }

    #[test]
    fn blank_company_fields_are_ignored() {
        let settings = vec![
            Setting { key: COMPANY_NAME.into(), value: "Acme Studio".into(), updated_at: None },
            Setting { key: UPI_ID.into(), value: "  ".into(), updated_at: None },
        ];
        let profile = CompanyProfile::from_settings(&settings);
        assert_eq!(profile.name.as_deref(), Some("Acme Studio"));
        assert!(profile.upi_id.is_none());
        assert!(profile.gstin.is_none());
    }
}
