// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ClientRepository, CounterRepository, DashboardRepository, InvoiceRepository, PaymentRepository,
        QuoteRepository, SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        client_service::ClientService,
        conversion_service::ConversionService,
        dashboard_service::DashboardService,
        document_service::{DocumentService, PdfConfig},
        invoice_service::InvoiceService,
        numbering::NumberingService,
        payment_service::PaymentService,
        quote_service::QuoteService,
        settings_service::SettingsService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub pdf: PdfConfig,
    // None disables the background overdue sweep
    pub overdue_sweep_interval: Option<Duration>,
}

impl Config {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let overdue_sweep_interval = match env::var("OVERDUE_SWEEP_INTERVAL_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("OVERDUE_SWEEP_INTERVAL_SECS is not a number: {raw}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            pdf: PdfConfig {
                fonts_dir: env::var("PDF_FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
                font_family: env::var("PDF_FONT_FAMILY").unwrap_or_else(|_| "Roboto".to_string()),
            },
            overdue_sweep_interval,
        })
    }
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub quote_service: QuoteService,
    pub conversion_service: ConversionService,
    pub invoice_service: InvoiceService,
    pub payment_service: PaymentService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Could not connect to the database")?;

        tracing::info!("Database connection established");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Dependency graph ---
    pub fn with_pool(db_pool: PgPool, config: &Config) -> Self {
        let settings_repo = SettingsRepository::new();
        let quote_repo = QuoteRepository::new();
        let client_repo = ClientRepository::new();
        let invoice_repo = InvoiceRepository::new();
        let payment_repo = PaymentRepository::new();

        let numbering = NumberingService::new(CounterRepository::new(), settings_repo.clone());

        Self {
            auth_service: AuthService::new(
                UserRepository::new(db_pool.clone()),
                config.jwt_secret.clone(),
                db_pool.clone(),
            ),
            client_service: ClientService::new(client_repo.clone()),
            quote_service: QuoteService::new(quote_repo.clone(), client_repo, numbering.clone()),
            conversion_service: ConversionService::new(quote_repo.clone(), invoice_repo.clone(), numbering),
            invoice_service: InvoiceService::new(invoice_repo.clone(), payment_repo.clone()),
            payment_service: PaymentService::new(payment_repo, invoice_repo.clone()),
            settings_service: SettingsService::new(settings_repo.clone()),
            dashboard_service: DashboardService::new(DashboardRepository::new()),
            document_service: DocumentService::new(quote_repo, invoice_repo, settings_repo, config.pdf.clone()),
            db_pool,
        }
    }
}
