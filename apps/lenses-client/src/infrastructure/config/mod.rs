//! Configuration Module
//!
//! Configuration loading for the client and the `lenses` binary.

mod settings;

pub use settings::{ClientConfig, ConfigError, Credentials, SessionSettings};
