//! Local reference backend: every "node" is a child process of the launcher.
//!
//! Useful for single-host runs and for exercising the launch path end to end.
mod config;
pub use config::{ConfirmMode, LocalBackendConfig};

mod logger;
pub use logger::LogConfig;

mod daemons;
pub use daemons::DaemonTable;

mod backend;
pub use backend::LocalBackend;

mod comm;
pub use comm::LocalComm;
