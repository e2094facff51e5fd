pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod notify;
pub mod reports;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use config::Config;
