//! Middleware shipped with the router.
//!
//! - [`Recovery`] turns errors and panics raised further down the chain into a `500` response
//! - [`Logger`] logs the status and latency of every request it wraps

mod logger;
mod recovery;

pub use logger::{logger, Logger};
pub use recovery::{recovery, Recovery};
