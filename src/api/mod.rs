pub mod client;

pub use client::{ApiClient, ApiError, DEFAULT_BASE_URL, DEFAULT_USER};
