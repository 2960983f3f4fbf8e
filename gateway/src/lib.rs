//! Gateway wiring: configuration, reference collaborators, and the request
//! handlers that bind the pipelines to the external endpoint contracts.

pub mod config;
pub mod handlers;
pub mod sim;

pub use config::AppConfig;
pub use handlers::Gateway;
