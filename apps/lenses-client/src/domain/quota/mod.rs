//! Client Quota Types
//!
//! Kafka client quotas as administered through the Lenses REST API.
//!
//! # Targets
//!
//! A quota applies to one of six targets, each with its own resource path
//! under `/api/quotas`:
//!
//! | Target           | Path                        |
//! |------------------|-----------------------------|
//! | all users        | `/users`                    |
//! | user             | `/users/{user}`             |
//! | user, all clients| `/users/{user}/clients`     |
//! | user and client  | `/users/{user}/clients/{id}`|
//! | client           | `/clients/{id}`             |
//! | all clients      | `/clients`                  |

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Configuration key for the producer byte rate.
pub const PRODUCER_BYTE_RATE: &str = "producer_byte_rate";
/// Configuration key for the consumer byte rate.
pub const CONSUMER_BYTE_RATE: &str = "consumer_byte_rate";
/// Configuration key for the request percentage.
pub const REQUEST_PERCENTAGE: &str = "request_percentage";

/// Client id values that select every client.
const ALL_CLIENTS: [&str; 2] = ["all", "*"];

/// Whether a client id selects every client.
#[must_use]
pub fn is_all_clients(client: &str) -> bool {
    ALL_CLIENTS.contains(&client)
}

// =============================================================================
// Quota Config
// =============================================================================

/// Quota limits. Values are sent to the server as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Bytes per second a producer may publish.
    #[serde(
        default,
        alias = "ProducerByteRate",
        skip_serializing_if = "Option::is_none"
    )]
    pub producer_byte_rate: Option<String>,

    /// Bytes per second a consumer may fetch.
    #[serde(
        default,
        alias = "ConsumerByteRate",
        skip_serializing_if = "Option::is_none"
    )]
    pub consumer_byte_rate: Option<String>,

    /// Share of broker request handler time.
    #[serde(
        default,
        alias = "RequestPercentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_percentage: Option<String>,
}

impl QuotaConfig {
    /// Every configuration key, in wire order.
    pub const KEYS: [&'static str; 3] = [PRODUCER_BYTE_RATE, CONSUMER_BYTE_RATE, REQUEST_PERCENTAGE];

    /// Whether no limit is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.producer_byte_rate.is_none()
            && self.consumer_byte_rate.is_none()
            && self.request_percentage.is_none()
    }
}

// =============================================================================
// Quota Listing
// =============================================================================

/// A quota as listed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    /// `USER`, `CLIENT`, `USERCLIENT` or a default variant.
    #[serde(default)]
    pub entity_type: String,
    /// User or client the quota belongs to.
    #[serde(default)]
    pub entity_name: String,
    /// Client id for user and client quotas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
    /// Configured limits keyed by config name.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Resource URL of the quota.
    #[serde(default)]
    pub url: String,
    /// Whether the caller may modify the quota.
    #[serde(default)]
    pub is_authorized: bool,
}

// =============================================================================
// Quota Target
// =============================================================================

/// What a quota applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaTarget {
    /// Default quota for every user.
    AllUsers,
    /// A single user.
    User(String),
    /// Every client of a user.
    UserAllClients(String),
    /// A single client of a user.
    UserClient {
        /// User name.
        user: String,
        /// Client id.
        client: String,
    },
    /// A single client.
    Client(String),
    /// Default quota for every client.
    AllClients,
}

impl QuotaTarget {
    /// Resolve a user scoped target.
    ///
    /// Without a user the client is ignored and the default user quota is
    /// selected.
    #[must_use]
    pub fn for_users(user: Option<&str>, client: Option<&str>) -> Self {
        let user = user.filter(|u| !u.is_empty());
        let client = client.filter(|c| !c.is_empty());

        match (user, client) {
            (None, _) => Self::AllUsers,
            (Some(user), None) => Self::User(user.to_string()),
            (Some(user), Some(client)) if is_all_clients(client) => {
                Self::UserAllClients(user.to_string())
            }
            (Some(user), Some(client)) => Self::UserClient {
                user: user.to_string(),
                client: client.to_string(),
            },
        }
    }

    /// Resolve a client scoped target. `all` and `*` select the default
    /// client quota.
    #[must_use]
    pub fn for_clients(client: Option<&str>) -> Self {
        match client {
            Some(id) if !id.is_empty() && !is_all_clients(id) => Self::Client(id.to_string()),
            _ => Self::AllClients,
        }
    }

    /// Resource path relative to `/api/quotas`, with segments
    /// percent-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        let enc = |s: &str| urlencoding::encode(s).into_owned();

        match self {
            Self::AllUsers => "/users".to_string(),
            Self::User(user) => format!("/users/{}", enc(user)),
            Self::UserAllClients(user) => format!("/users/{}/clients", enc(user)),
            Self::UserClient { user, client } => {
                format!("/users/{}/clients/{}", enc(user), enc(client))
            }
            Self::Client(client) => format!("/clients/{}", enc(client)),
            Self::AllClients => "/clients".to_string(),
        }
    }
}

impl fmt::Display for QuotaTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => f.write_str("default user quota"),
            Self::User(user) => write!(f, "user '{user}'"),
            Self::UserAllClients(user) => write!(f, "user '{user}' and all clients"),
            Self::UserClient { user, client } => write!(f, "user '{user}' and client '{client}'"),
            Self::Client(client) => write!(f, "client '{client}'"),
            Self::AllClients => f.write_str("default client quota"),
        }
    }
}

/// Action named in delete outcome messages: removing specific keys is an
/// update, removing the whole quota is a delete.
#[must_use]
pub fn delete_verb<S: AsRef<str>>(keys: &[S]) -> &'static str {
    if keys.is_empty() { "delete" } else { "update" }
}
