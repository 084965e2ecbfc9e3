//! Adapters Layer
//!
//! Inbound adapters (web front-end) and outbound adapters (dog image API,
//! configuration stores).

pub mod inbound;
pub mod outbound;
