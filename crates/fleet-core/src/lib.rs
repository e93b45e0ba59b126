pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod launch;
pub mod metrics;
pub mod module;
pub mod state;
pub mod vm;

pub use backend::{BackendError, SpawnBackend, SpawnHandle, SpawnStatus};
pub use config::LaunchConfig;
pub use context::LaunchContext;
pub use error::CoreError;
pub use launch::{
    DaemonArgv, DaemonCommand, DaemonLauncher, DefaultDaemonCommand, PlmModule, daemon_name,
};
pub use metrics::{LaunchOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use module::{DaemonComm, Directive, DirectiveKind, LaunchModule, ModuleRegistry};
pub use state::{
    Activation, Activator, HandlerContext, StateEvent, StateHandler, StateMachine, Subscribe,
};
pub use vm::{NodeSpec, PoolVirtualMachine, StaticVirtualMachine, VirtualMachine};

pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::launch::{DaemonLauncher, PlmModule};
    pub use crate::module::{DaemonComm, LaunchModule, ModuleRegistry};
    pub use crate::state::{Activator, StateMachine};
}
