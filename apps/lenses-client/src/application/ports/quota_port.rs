//! Quota Port (Driven Port)
//!
//! Interface for administering client quotas on the server.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quota::{Quota, QuotaConfig, QuotaTarget};

/// Errors from quota administration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// The quota does not exist.
    #[error("resource not found")]
    NotFound,

    /// The caller is not allowed to access the quota.
    #[error("resource not accessible")]
    NotAccessible,

    /// The server rejected the request.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the server.
        message: String,
    },

    /// The request could not be sent.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be parsed.
    #[error("JSON parsing error: {0}")]
    Json(String),
}

/// Port for quota administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaPort: Send + Sync {
    /// List every quota visible to the caller.
    async fn list_quotas(&self) -> Result<Vec<Quota>, QuotaError>;

    /// Create or replace the quota for a target.
    async fn set_quota(&self, target: &QuotaTarget, config: &QuotaConfig)
    -> Result<(), QuotaError>;

    /// Remove config keys from a target's quota. No keys removes all of
    /// them.
    async fn delete_quota(&self, target: &QuotaTarget, keys: &[String]) -> Result<(), QuotaError>;
}
