mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod flag;
pub use flag::Flag;

mod attributes;
pub use attributes::Attributes;

mod name;
pub use name::{Nspace, ProcName, Rank};

mod constants;
pub use constants::{
    ATTR_LAUNCH_ID, ENV_DAEMON_UMASK, ENV_JOB_NSPACE, ENV_LAUNCH_ID, ENV_LAUNCHER_PAUSE_FOR_TOOL,
    ENV_LAUNCHER_RENDEZVOUS_FILE, ENV_LIBRARY_PATH, ENV_PATH, ENV_PLM, PLM_DIRECT,
};
