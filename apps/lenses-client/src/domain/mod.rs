//! Domain Layer - Core administration types.
//!
//! Pure types with serialization support and no I/O.

/// Client quota configuration and targets.
pub mod quota;
