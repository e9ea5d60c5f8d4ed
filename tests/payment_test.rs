//! Payment recording and invoice reconciliation against Postgres.

mod common;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serial_test::serial;
use uuid::Uuid;

use common::{setup, TestApp};
use quotes_backend::{
    common::error::AppError,
    models::{
        invoice::{Invoice, PaymentStatus},
        payment::{NewPayment, RecordedPayment},
    },
};

fn payment(amount: Decimal, method: &str) -> NewPayment {
    NewPayment {
        amount,
        payment_method: method.to_string(),
        payment_date: Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
        transaction_id: Some("UTR-TEST".to_string()),
        notes: None,
    }
}

async fn pay(app: &TestApp, invoice: &Invoice, amount: Decimal) -> RecordedPayment {
    app.state
        .payment_service
        .record_payment(&app.pool, invoice.id, payment(amount, "upi"), app.user_id)
        .await
        .expect("Failed to record payment")
}

async fn paid_sum(app: &TestApp, invoice_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payment_history WHERE invoice_id = $1")
        .bind(invoice_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn partial_then_full_payment() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(2, dec!(100)), (1, dec!(50))]).await;

    let first = pay(&app, &invoice, dec!(100.00)).await;
    assert_eq!(first.invoice.paid_amount, dec!(100.00));
    assert_eq!(first.invoice.payment_status, PaymentStatus::Partial);
    assert!(first.overpayment.is_none());

    let second = pay(&app, &invoice, dec!(150.00)).await;
    assert_eq!(second.invoice.paid_amount, dec!(250.00));
    assert_eq!(second.invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(second.invoice.paid_amount, paid_sum(&app, invoice.id).await);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn overpayment_is_accepted_and_reported() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(100))]).await;

    let recorded = pay(&app, &invoice, dec!(120.00)).await;

    assert_eq!(recorded.invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(recorded.invoice.paid_amount, dec!(120.00));
    assert_eq!(recorded.overpayment, Some(dec!(20.00)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn deleting_a_payment_moves_the_status_back() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(250))]).await;

    let first = pay(&app, &invoice, dec!(100.00)).await;
    let second = pay(&app, &invoice, dec!(150.00)).await;
    assert_eq!(second.invoice.payment_status, PaymentStatus::Paid);

    let payments = &app.state.payment_service;

    let after = payments.delete_payment(&app.pool, second.payment.id).await.unwrap();
    assert_eq!(after.paid_amount, dec!(100.00));
    assert_eq!(after.payment_status, PaymentStatus::Partial);

    let after = payments.delete_payment(&app.pool, first.payment.id).await.unwrap();
    assert_eq!(after.paid_amount, dec!(0));
    assert_eq!(after.payment_status, PaymentStatus::Pending);
    assert_eq!(after.paid_amount, paid_sum(&app, invoice.id).await);

    let again = payments.delete_payment(&app.pool, first.payment.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn invalid_payments_are_rejected() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(100))]).await;
    let payments = &app.state.payment_service;

    for bad in [payment(dec!(0), "cash"), payment(dec!(-5), "cash"), payment(dec!(10), "paypal")] {
        let result = payments.record_payment(&app.pool, invoice.id, bad, app.user_id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    let missing = payments
        .record_payment(&app.pool, Uuid::new_v4(), payment(dec!(10), "cash"), app.user_id)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // nothing was stored by the rejected attempts
    assert_eq!(paid_sum(&app, invoice.id).await, Decimal::ZERO);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn paid_amount_never_outgrows_its_column() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(100))]).await;
    let payments = &app.state.payment_service;

    let too_large = payments
        .record_payment(&app.pool, invoice.id, payment(dec!(100000000000.00), "bank_transfer"), app.user_id)
        .await;
    assert!(matches!(too_large, Err(AppError::Validation(_))));

    // each over-payment fits, the running total would not
    let first = pay(&app, &invoice, dec!(9000000000.00)).await;
    assert_eq!(first.invoice.paid_amount, dec!(9000000000.00));

    let second = payments
        .record_payment(&app.pool, invoice.id, payment(dec!(9000000000.00), "bank_transfer"), app.user_id)
        .await;
    assert!(matches!(second, Err(AppError::Validation(_))));

    assert_eq!(paid_sum(&app, invoice.id).await, dec!(9000000000.00));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn concurrent_payments_all_count() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(300))]).await;

    let (_, _, last) = tokio::join!(
        pay(&app, &invoice, dec!(100)),
        pay(&app, &invoice, dec!(100)),
        pay(&app, &invoice, dec!(100)),
    );

    let detail = app.state.invoice_service.get_invoice(&app.pool, invoice.id).await.unwrap();
    assert_eq!(detail.invoice.paid_amount, dec!(300.00));
    assert_eq!(detail.invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(detail.payments.len(), 3);
    assert!(last.invoice.paid_amount <= dec!(300.00));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn sweep_marks_past_due_invoices_overdue() {
    let app = setup().await;
    let invoice = app.invoice_for(&[(1, dec!(80))]).await;
    pay(&app, &invoice, dec!(30.00)).await;

    sqlx::query("UPDATE invoices SET due_date = $2 WHERE id = $1")
        .bind(invoice.id)
        .bind(Utc::now() - Duration::days(1))
        .execute(&app.pool)
        .await
        .unwrap();

    let updated = app.state.invoice_service.sweep_overdue(&app.pool, Utc::now()).await.unwrap();
    assert!(updated >= 1);

    let detail = app.state.invoice_service.get_invoice(&app.pool, invoice.id).await.unwrap();
    assert_eq!(detail.invoice.payment_status, PaymentStatus::Overdue);
    assert_eq!(detail.balance_due, dec!(50.00));

    // settling the balance wins over the due date
    let settled = pay(&app, &invoice, dec!(50.00)).await;
    assert_eq!(settled.invoice.payment_status, PaymentStatus::Paid);
}
