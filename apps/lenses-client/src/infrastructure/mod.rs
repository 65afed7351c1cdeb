//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Live SQL streaming over WebSocket.
pub mod live;

/// REST client for the administration API.
pub mod rest;

/// Configuration loading.
pub mod config;

/// Command line interface for the `lenses` binary.
pub mod cli;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
