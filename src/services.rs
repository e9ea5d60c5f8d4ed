pub mod auth;
pub mod client_service;
pub mod conversion_service;
pub mod dashboard_service;
pub mod document_service;
pub mod invoice_service;
pub mod numbering;
pub mod payment_service;
pub mod quote_service;
pub mod settings_service;
