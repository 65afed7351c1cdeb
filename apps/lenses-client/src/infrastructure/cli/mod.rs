//! Command Line Interface
//!
//! `clap` definitions and handlers for the `lenses` binary.
//!
//! ```text
//! lenses query <SQL> [--live] [--stats N]
//! lenses quotas [--json]
//! lenses quota users set|delete [--quota-user U] [--quota-client C] ...
//! lenses quota clients set|delete [--quota-client C] ...
//! ```

pub mod args;
pub mod query;
pub mod quota;

pub use args::{Cli, Command};
pub use query::{QueryReport, SharedWriter, run_query};
pub use quota::{QuotaPayload, format_quota, parse_quota_config, resolve_payload, run_list, run_quota};
