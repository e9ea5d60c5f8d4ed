//! Settings store and the numbering prefixes it feeds.

mod common;

use rust_decimal_macros::dec;
use serial_test::serial;

use common::setup;
use quotes_backend::{
    common::error::AppError,
    models::settings::{UpdateSettingRequest, INVOICE_PREFIX},
};

fn value(v: &str) -> UpdateSettingRequest {
    UpdateSettingRequest { value: v.to_string() }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn invoice_prefix_setting_drives_numbering() {
    let app = setup().await;
    let settings = &app.state.settings_service;

    settings.update_setting(&app.pool, INVOICE_PREFIX, value("BILL")).await.unwrap();
    let invoice = app.invoice_for(&[(1, dec!(10))]).await;

    // restore before asserting so a failure does not leak into other tests
    settings.update_setting(&app.pool, INVOICE_PREFIX, value("INV")).await.unwrap();

    assert!(invoice.invoice_number.starts_with("BILL-"), "{}", invoice.invoice_number);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn unknown_keys_are_rejected() {
    let app = setup().await;
    let settings = &app.state.settings_service;

    let put = settings.update_setting(&app.pool, "favouriteColour", value("blue")).await;
    assert!(matches!(put, Err(AppError::Validation(_))));

    let get = settings.get_setting(&app.pool, "favouriteColour").await;
    assert!(matches!(get, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn listing_includes_prefix_defaults() {
    let app = setup().await;
    let settings = app.state.settings_service.list_settings(&app.pool).await.unwrap();

    assert!(settings.iter().any(|s| s.key == "quotePrefix"));
    assert!(settings.iter().any(|s| s.key == "invoicePrefix"));
}
