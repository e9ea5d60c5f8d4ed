pub mod auth;
pub mod client;
pub mod dashboard;
pub mod invoice;
pub mod payment;
pub mod quote;
pub mod settings;
