// src/main.rs

use chrono::Utc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use quotes_backend::{
    config::{AppState, Config},
    routes::build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Configuration problems stop the process before it binds anything
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("Database migrations applied");

    // Overdue status also changes with time alone, not only on payments
    if let Some(every) = config.overdue_sweep_interval {
        let state = app_state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if let Err(e) = state.invoice_service.sweep_overdue(&state.db_pool, Utc::now()).await {
                    tracing::error!(error = %e, "Overdue sweep failed");
                }
            }
        });
        tracing::info!(interval_secs = every.as_secs(), "Overdue sweep scheduled");
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
