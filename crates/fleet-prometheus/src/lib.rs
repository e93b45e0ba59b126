//! Prometheus backend for launch metrics.
//!
//! ```rust
//! use std::sync::Arc;
//! use fleet_core::LaunchContext;
//! use fleet_model::Env;
//! use fleet_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let ctx = LaunchContext::new(Env::default(), Arc::new(metrics.clone()));
//! # let _ = ctx;
//! let text = metrics.encode_text()?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `fleet_daemons_spawned_total{backend}`
//! - `fleet_launches_total{backend, outcome}`
//! - `fleet_launch_duration_seconds{backend}`
//! - `fleet_backend_errors_total{backend, error_kind}`
//!
//! No HTTP endpoint is provided; expose [`PrometheusMetrics::gather`] through whatever server the host already runs.
mod backend;
pub use backend::PrometheusMetrics;
