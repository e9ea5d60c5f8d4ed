//! Revenue analytics over quotes, invoices and payments.

mod common;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serial_test::serial;

use common::{setup, TestApp};
use quotes_backend::models::{
    invoice::Invoice,
    payment::NewPayment,
    quote::{QuoteCharges, QuoteStatus},
};

/// Aggregates read every row, so each test starts from empty business tables.
async fn clear_business_data(app: &TestApp) {
    sqlx::query("TRUNCATE payment_history, invoices, quote_items, quotes, clients")
        .execute(&app.pool)
        .await
        .expect("Failed to clear business tables");
}

async fn pay_today(app: &TestApp, invoice: &Invoice, amount: Decimal) {
    let input = NewPayment {
        amount,
        payment_method: "cash".to_string(),
        payment_date: Some(Utc::now().date_naive()),
        transaction_id: None,
        notes: None,
    };

    app.state
        .payment_service
        .record_payment(&app.pool, invoice.id, input, app.user_id)
        .await
        .expect("Failed to record payment");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn summary_counts_quotes_and_outstanding_balance() {
    let app = setup().await;
    clear_business_data(&app).await;

    let overpaid = app.invoice_for(&[(1, dec!(250.00))]).await;
    pay_today(&app, &overpaid, dec!(300.00)).await;

    let partial = app.invoice_for(&[(1, dec!(100.00))]).await;
    pay_today(&app, &partial, dec!(40.00)).await;

    let client_id = app.create_client("Pipeline Client").await;
    app.create_quote(client_id, &[(1, dec!(10))], QuoteCharges::default()).await;
    let sent = app.create_quote(client_id, &[(1, dec!(20))], QuoteCharges::default()).await;
    let rejected = app.create_quote(client_id, &[(1, dec!(30))], QuoteCharges::default()).await;

    let quotes = &app.state.quote_service;
    quotes.transition_quote(&app.pool, sent.quote.id, QuoteStatus::Sent).await.unwrap();
    quotes.transition_quote(&app.pool, rejected.quote.id, QuoteStatus::Sent).await.unwrap();
    quotes.transition_quote(&app.pool, rejected.quote.id, QuoteStatus::Rejected).await.unwrap();

    let summary = app.state.dashboard_service.get_summary(&app.pool).await.unwrap();

    assert_eq!(summary.draft_quotes, 1);
    assert_eq!(summary.sent_quotes, 1);
    assert_eq!(summary.approved_quotes, 0);
    assert_eq!(summary.rejected_quotes, 1);
    assert_eq!(summary.invoiced_quotes, 2);

    assert_eq!(summary.total_invoiced, dec!(350.00));
    assert_eq!(summary.total_collected, dec!(340.00));
    // the 50.00 over-paid on one invoice does not reduce the 60.00 owed on the other
    assert_eq!(summary.outstanding, dec!(60.00));
    assert_eq!(summary.overdue_invoices, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn top_clients_are_ranked_by_collected_revenue() {
    let app = setup().await;
    clear_business_data(&app).await;

    let small = app.invoice_for(&[(1, dec!(500.00))]).await;
    pay_today(&app, &small, dec!(50.00)).await;

    let large = app.invoice_for(&[(1, dec!(500.00))]).await;
    pay_today(&app, &large, dec!(400.00)).await;

    let unpaid = app.invoice_for(&[(1, dec!(500.00))]).await;

    let top = app.state.dashboard_service.get_top_clients(&app.pool).await.unwrap();

    let ranking: Vec<_> = top.iter().map(|c| c.client_id).collect();
    assert_eq!(ranking, vec![large.client_id, small.client_id, unpaid.client_id]);
    assert_eq!(top[0].total_revenue, Some(dec!(400.00)));
    assert_eq!(top[0].invoice_count, 1);
    assert_eq!(top[2].total_revenue, Some(dec!(0.00)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn monthly_revenue_sums_this_months_payments() {
    let app = setup().await;
    clear_business_data(&app).await;

    let first = app.invoice_for(&[(1, dec!(200.00))]).await;
    pay_today(&app, &first, dec!(120.00)).await;
    pay_today(&app, &first, dec!(30.00)).await;

    let second = app.invoice_for(&[(1, dec!(90.00))]).await;
    pay_today(&app, &second, dec!(90.00)).await;

    let revenue = app.state.dashboard_service.get_monthly_revenue(&app.pool).await.unwrap();

    assert_eq!(revenue.len(), 1);
    assert_eq!(revenue[0].month.as_deref(), Some(Utc::now().format("%Y-%m").to_string().as_str()));
    assert_eq!(revenue[0].total, Some(dec!(240.00)));
}
