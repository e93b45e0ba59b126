mod error;
pub use error::ExecError;

mod signal;
pub use signal::send_signal;

/// Local backend identifier for logs and metrics.
pub const BACKEND_LOCAL: &str = "local";

#[cfg(feature = "local")]
pub mod local;
