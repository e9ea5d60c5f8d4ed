pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod invoices;
pub mod payments;
pub mod quotes;
pub mod settings;
