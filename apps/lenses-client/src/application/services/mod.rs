//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `QuotaCommands`: set, delete and list client quotas, producing the
//!   user facing outcome messages

mod quota_commands;

pub use quota_commands::{CommandError, QuotaCommands};
