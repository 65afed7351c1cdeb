//! Lenses REST Adapter
//!
//! HTTP client for the administration API and its [`QuotaPort`]
//! implementation.
//!
//! [`QuotaPort`]: crate::application::ports::QuotaPort

pub mod client;
pub mod error;

pub use client::{LensesHttpClient, QUOTAS_PATH, RestConfig, TOKEN_HEADER};
pub use error::ApiErrorResponse;
