//! Quote lifecycle and quote -> invoice conversion against Postgres.

mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serial_test::serial;
use uuid::Uuid;

use common::{item, setup};
use quotes_backend::{
    common::error::AppError,
    db::InvoiceRepository,
    models::{
        invoice::PaymentStatus,
        quote::{NewQuote, QuoteCharges, QuotePatch, QuoteStatus},
    },
    services::numbering::next_number,
};

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn create_quote_numbers_and_totals_it() {
    let app = setup().await;
    let client_id = app.create_client("Totals Client").await;

    let charges = QuoteCharges { cgst: dec!(9.00), sgst: dec!(9.00), ..Default::default() };
    let detail = app
        .create_quote(client_id, &[(2, dec!(100.00)), (1, dec!(50.00))], charges)
        .await;

    assert!(detail.quote.quote_number.starts_with("QT-"));
    assert_eq!(detail.quote.status, QuoteStatus::Draft);
    assert_eq!(detail.quote.subtotal, dec!(250.00));
    assert_eq!(detail.quote.total, dec!(268.00));
    assert_eq!(detail.client_name, "Totals Client");
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].subtotal, dec!(200.00));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn consecutive_quotes_get_consecutive_numbers() {
    let app = setup().await;
    let client_id = app.create_client("Numbering Client").await;

    let first = app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;
    let second = app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;

    let expected = next_number("QT", Some(&first.quote.quote_number)).unwrap();
    assert_eq!(second.quote.quote_number, expected);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn concurrent_quotes_never_share_a_number() {
    let app = setup().await;
    let client_id = app.create_client("Race Client").await;

    let items = [(1, dec!(1))];
    let (a, b) = tokio::join!(
        app.create_quote(client_id, &items, QuoteCharges::default()),
        app.create_quote(client_id, &items, QuoteCharges::default()),
    );

    assert_ne!(a.quote.quote_number, b.quote.quote_number);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn amounts_too_large_to_store_are_rejected() {
    let app = setup().await;
    let client_id = app.create_client("Oversized Client").await;

    let huge_price = NewQuote {
        client_id,
        items: vec![item("Yacht", 1, dec!(100000000000.00))],
        charges: QuoteCharges::default(),
        quote_date: None,
        valid_until: None,
        notes: None,
        terms: None,
    };
    let result = app.state.quote_service.create_quote(&app.pool, huge_price, app.user_id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // two lines that fit on their own but not together
    let huge_total = NewQuote {
        client_id,
        items: vec![item("Hull", 1, dec!(6000000000.00)), item("Sails", 1, dec!(6000000000.00))],
        charges: QuoteCharges::default(),
        quote_date: None,
        valid_until: None,
        notes: None,
        terms: None,
    };
    let result = app.state.quote_service.create_quote(&app.pool, huge_total, app.user_id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE client_id = $1")
        .bind(client_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn unknown_client_is_not_found() {
    let app = setup().await;

    let input = NewQuote {
        client_id: Uuid::new_v4(),
        items: vec![item("Design", 1, dec!(10))],
        charges: QuoteCharges::default(),
        quote_date: None,
        valid_until: None,
        notes: None,
        terms: None,
    };
    let result = app.state.quote_service.create_quote(&app.pool, input, app.user_id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn items_follow_sort_order_then_insertion() {
    let app = setup().await;
    let client_id = app.create_client("Order Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(1))], QuoteCharges::default()).await;
    let id = quote.quote.id;

    let mut late = item("Late", 1, dec!(2));
    late.sort_order = Some(0);
    let mut first = item("First", 1, dec!(3));
    first.sort_order = Some(-1);

    app.state.quote_service.add_item(&app.pool, id, late).await.unwrap();
    let detail = app.state.quote_service.add_item(&app.pool, id, first).await.unwrap();

    let names: Vec<&str> = detail.items.iter().map(|i| i.description.as_str()).collect();
    // "Service" was inserted before "Late" with the same sort order
    assert_eq!(names, vec!["First", "Service", "Late"]);
    assert_eq!(detail.quote.subtotal, dec!(6.00));
    assert_eq!(detail.quote.total, dec!(6.00));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn patching_charges_and_items_recomputes_totals() {
    let app = setup().await;
    let client_id = app.create_client("Patch Client").await;
    let quote = app.create_quote(client_id, &[(2, dec!(100))], QuoteCharges::default()).await;

    let patch = QuotePatch { discount: Some(dec!(20.00)), ..Default::default() };
    let detail = app.state.quote_service.update_quote(&app.pool, quote.quote.id, patch).await.unwrap();
    assert_eq!(detail.quote.total, dec!(180.00));

    let patch = QuotePatch {
        items: Some(vec![item("Smaller", 1, dec!(50))]),
        ..Default::default()
    };
    let detail = app.state.quote_service.update_quote(&app.pool, quote.quote.id, patch).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.quote.subtotal, dec!(50.00));
    assert_eq!(detail.quote.total, dec!(30.00));

    // discount would now exceed the amount
    let patch = QuotePatch { discount: Some(dec!(60.00)), ..Default::default() };
    let result = app.state.quote_service.update_quote(&app.pool, quote.quote.id, patch).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn patching_an_unknown_quote_is_not_found() {
    let app = setup().await;
    let patch = QuotePatch { notes: Some("hello".into()), ..Default::default() };
    let result = app.state.quote_service.update_quote(&app.pool, Uuid::new_v4(), patch).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn lifecycle_rejects_backward_moves() {
    let app = setup().await;
    let client_id = app.create_client("Lifecycle Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;
    let id = quote.quote.id;
    let quotes = &app.state.quote_service;

    // draft cannot jump to approved
    let jump = quotes.transition_quote(&app.pool, id, QuoteStatus::Approved).await;
    assert!(matches!(jump, Err(AppError::Conflict(_))));

    quotes.transition_quote(&app.pool, id, QuoteStatus::Sent).await.unwrap();
    quotes.transition_quote(&app.pool, id, QuoteStatus::Rejected).await.unwrap();

    let reopen = quotes.transition_quote(&app.pool, id, QuoteStatus::Sent).await;
    assert!(matches!(reopen, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn approved_quote_items_are_frozen() {
    let app = setup().await;
    let client_id = app.create_client("Frozen Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;
    app.approve(quote.quote.id).await;

    let result = app
        .state
        .quote_service
        .add_item(&app.pool, quote.quote.id, item("Extra", 1, dec!(5)))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn conversion_creates_one_pending_invoice() {
    let app = setup().await;
    let client_id = app.create_client("Convert Client").await;
    let quote = app.create_quote(client_id, &[(2, dec!(100)), (1, dec!(50))], QuoteCharges::default()).await;
    let quote_id = quote.quote.id;
    app.approve(quote_id).await;

    let before = Utc::now();
    let invoice = app
        .state
        .conversion_service
        .convert_to_invoice(&app.pool, quote_id, app.user_id)
        .await
        .unwrap();

    assert!(invoice.invoice_number.starts_with("INV-"));
    assert_eq!(invoice.total, dec!(250.00));
    assert_eq!(invoice.paid_amount, dec!(0));
    assert_eq!(invoice.payment_status, PaymentStatus::Pending);
    assert!(invoice.due_date >= before + Duration::days(30));
    assert!(invoice.due_date <= Utc::now() + Duration::days(30));

    let quote = app.state.quote_service.get_quote(&app.pool, quote_id).await.unwrap();
    assert_eq!(quote.quote.status, QuoteStatus::Invoiced);

    // second call is a conflict and leaves the first invoice alone
    let again = app
        .state
        .conversion_service
        .convert_to_invoice(&app.pool, quote_id, app.user_id)
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let stored = InvoiceRepository::new().find_by_quote(&app.pool, quote_id).await.unwrap().unwrap();
    assert_eq!(stored.id, invoice.id);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn concurrent_conversions_yield_exactly_one_invoice() {
    let app = setup().await;
    let client_id = app.create_client("Race Convert Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(99))], QuoteCharges::default()).await;
    let quote_id = quote.quote.id;
    app.approve(quote_id).await;

    let conversions = &app.state.conversion_service;
    let (a, b) = tokio::join!(
        conversions.convert_to_invoice(&app.pool, quote_id, app.user_id),
        conversions.convert_to_invoice(&app.pool, quote_id, app.user_id),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert!(matches!(a.err().or(b.err()), Some(AppError::Conflict(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn unapproved_or_unknown_quotes_do_not_convert() {
    let app = setup().await;
    let client_id = app.create_client("Draft Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;
    let conversions = &app.state.conversion_service;

    let draft = conversions.convert_to_invoice(&app.pool, quote.quote.id, app.user_id).await;
    assert!(matches!(draft, Err(AppError::Conflict(_))));

    let missing = conversions.convert_to_invoice(&app.pool, Uuid::new_v4(), app.user_id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn deleting_a_quote_removes_its_items() {
    let app = setup().await;
    let client_id = app.create_client("Delete Client").await;
    let quote = app.create_quote(client_id, &[(1, dec!(10)), (2, dec!(5))], QuoteCharges::default()).await;
    let id = quote.quote.id;

    app.state.quote_service.delete_quote(&app.pool, id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items WHERE quote_id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let gone = app.state.quote_service.get_quote(&app.pool, id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    // client is free to go now
    app.state.client_service.delete_client(&app.pool, client_id).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn invoiced_quotes_and_their_clients_stay() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(10))]).await;

    let quote = app.state.quote_service.delete_quote(&app.pool, invoice.quote_id).await;
    assert!(matches!(quote, Err(AppError::Conflict(_))));

    let client = app.state.client_service.delete_client(&app.pool, invoice.client_id).await;
    assert!(matches!(client, Err(AppError::Conflict(_))));
}
