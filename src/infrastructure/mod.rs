//! Infrastructure Layer
//!
//! Background tasks and process lifecycle.

pub mod config_refresher;
pub mod shutdown;

pub use config_refresher::{ConfigRefresher, DEFAULT_POLL_INTERVAL};
pub use shutdown::{shutdown_signal, ShutdownController};
