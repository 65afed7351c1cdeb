//! Live Query Message Types
//!
//! Wire format types for the SQL execution WebSocket stream.
//!
//! # Wire Format (JSON)
//!
//! ```json
//! {
//!   "type": "RECORD",
//!   "data": {
//!     "key": "k-1",
//!     "value": {"amount": 42},
//!     "metadata": {
//!       "timestamp": 1700000000000,
//!       "__keysize": 3,
//!       "__valuesize": 13,
//!       "partition": 0,
//!       "offset": 17
//!     },
//!     "rownum": 1
//!   }
//! }
//! ```
//!
//! Control messages (`HEARTBEAT`, `SUCCESS`, `END`, ...) carry the same
//! envelope with an empty or partial `data` object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

// =============================================================================
// Message Type Tag
// =============================================================================

/// Message type discriminator sent by the server in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseType {
    /// Query failed on the server.
    Error,
    /// The request was rejected (bad SQL, bad parameters).
    InvalidRequest,
    /// A result row.
    Record,
    /// Keep-alive from the server.
    Heartbeat,
    /// Query accepted.
    Success,
    /// Periodic execution statistics.
    Stats,
    /// No more rows will be sent (browse queries).
    End,
}

impl ResponseType {
    /// Every concrete message type, in wildcard expansion order.
    pub const ALL: [Self; 7] = [
        Self::Error,
        Self::InvalidRequest,
        Self::Record,
        Self::Heartbeat,
        Self::Success,
        Self::Stats,
        Self::End,
    ];

    /// Wire name of the message type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::InvalidRequest => "INVALIDREQUEST",
            Self::Record => "RECORD",
            Self::Heartbeat => "HEARTBEAT",
            Self::Success => "SUCCESS",
            Self::Stats => "STATS",
            Self::End => "END",
        }
    }

    /// Look up a message type by its wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|typ| typ.as_str() == name)
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a listener registration.
///
/// `Wildcard` never appears on an inbound message; registering under it
/// registers the listener for every [`ResponseType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    /// A single message type.
    Type(ResponseType),
    /// All message types.
    Wildcard,
}

impl From<ResponseType> for Subscription {
    fn from(typ: ResponseType) -> Self {
        Self::Type(typ)
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Record metadata reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Record timestamp in epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,

    /// Encoded key size in bytes.
    #[serde(default, rename = "__keysize")]
    pub key_size: i64,

    /// Encoded value size in bytes.
    #[serde(default, rename = "__valuesize")]
    pub value_size: i64,

    /// Source partition.
    #[serde(default)]
    pub partition: i32,

    /// Offset within the partition.
    #[serde(default)]
    pub offset: i64,
}

impl Metadata {
    /// Record timestamp as a UTC datetime, if it is in range.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Message payload.
///
/// Key and value are kept as the raw JSON text the server sent, byte for
/// byte. `None` when the field is absent or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Data {
    /// Record key.
    #[serde(default)]
    pub key: Option<Box<RawValue>>,

    /// Record value.
    #[serde(default)]
    pub value: Option<Box<RawValue>>,

    /// Record metadata.
    #[serde(default)]
    pub metadata: Metadata,

    /// Row number within the result set.
    #[serde(default, rename = "rownum")]
    pub row_num: i64,
}

impl Data {
    /// Raw JSON text of the record key.
    #[must_use]
    pub fn key_json(&self) -> Option<&str> {
        self.key.as_deref().map(RawValue::get)
    }

    /// Raw JSON text of the record value.
    #[must_use]
    pub fn value_json(&self) -> Option<&str> {
        self.value.as_deref().map(RawValue::get)
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveResponse {
    /// Message type.
    #[serde(rename = "type")]
    pub typ: ResponseType,

    /// Message payload.
    #[serde(default)]
    pub data: Data,
}

impl LiveResponse {
    /// Create a message with an empty payload.
    #[must_use]
    pub fn new(typ: ResponseType) -> Self {
        Self {
            typ,
            data: Data::default(),
        }
    }
}
