pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod counter_repo;
pub use counter_repo::CounterRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
