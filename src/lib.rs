pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod pricing;
pub mod schema;
pub mod security;
pub mod session;
#[cfg(test)]
pub mod test_helpers;
pub mod types;

pub use client::{ApiClient, ApiRequest, Method, Navigator};
pub use config::ClientConfig;
pub use errors::{ApiError, ApiResult, ErrorKind};
pub use models::credentials::Credentials;
pub use pricing::Quote;
pub use session::SessionStore;
