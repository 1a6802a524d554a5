//! Shared utilities

pub mod api_client;

pub use api_client::{ApiClient, ApiClientConfig, ApiResponse, RequestOptions};
