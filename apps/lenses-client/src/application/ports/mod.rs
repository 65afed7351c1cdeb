//! Port Interfaces
//!
//! Interfaces (ports) for external systems following the Hexagonal
//! Architecture pattern. Infrastructure adapters implement them.
//!
//! ## Driven Ports (Outbound)
//!
//! - `FrameTransport`: duplex connection a live session reads frames from
//! - `QuotaPort`: quota administration REST API

mod quota_port;
mod transport_port;

pub use quota_port::{QuotaError, QuotaPort};
#[cfg(test)]
pub use quota_port::MockQuotaPort;
pub use transport_port::{Frame, FrameTransport, TransportError};
