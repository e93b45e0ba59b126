mod domain;
pub use domain::{
    ATTR_LAUNCH_ID, ENV_DAEMON_UMASK, ENV_JOB_NSPACE, ENV_LAUNCH_ID, ENV_LAUNCHER_PAUSE_FOR_TOOL,
    ENV_LAUNCHER_RENDEZVOUS_FILE, ENV_LIBRARY_PATH, ENV_PATH, ENV_PLM, PLM_DIRECT,
};
pub use domain::{Attributes, Env, Flag, KeyValue, Nspace, ProcName, Rank};

mod error;
pub use error::{ModelError, ModelResult};

mod job;
pub use job::{AppContext, Job, JobFlags, JobMap, JobRegistry, JobState, Node, NodeFlags};
