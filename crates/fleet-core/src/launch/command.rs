use fleet_model::{Nspace, ProcName, Rank};

use crate::config::LaunchConfig;

const RANK_PLACEHOLDER: &str = "<template>";

const ARG_NSPACE: &str = "--nspace";
const ARG_RANK: &str = "--rank";

/// Daemon identity carried by a command line built by [`DefaultDaemonCommand`].
///
/// `None` when either flag is missing or the rank is not a number.
pub fn daemon_name(argv: &[String]) -> Option<ProcName> {
    let value_of = |flag: &str| {
        argv.iter()
            .position(|a| a == flag)
            .and_then(|i| argv.get(i + 1))
    };
    let nspace = value_of(ARG_NSPACE)?;
    let rank = value_of(ARG_RANK)?.parse().ok()?;
    Some(ProcName::new(Nspace::new(nspace.as_str()), rank))
}

/// Daemon command line with a slot reserved for the per-node rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonArgv {
    argv: Vec<String>,
    rank_index: usize,
}

impl DaemonArgv {
    /// `rank_index` must point into `argv`.
    pub fn new(argv: Vec<String>, rank_index: usize) -> Self {
        debug_assert!(rank_index < argv.len());
        Self { argv, rank_index }
    }

    /// Overwrite the rank slot.
    pub fn set_rank(&mut self, rank: Rank) {
        if let Some(slot) = self.argv.get_mut(self.rank_index) {
            *slot = rank.to_string();
        }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn rank_index(&self) -> usize {
        self.rank_index
    }
}

/// Builds the command line shared by every daemon of one launch.
pub trait DaemonCommand: Send + Sync {
    fn build(&self, backend: &str, daemons: &Nspace) -> DaemonArgv;
}

/// `<program> [extra args] --launcher <backend> --nspace <daemon nspace> --rank <rank>`
#[derive(Debug, Clone)]
pub struct DefaultDaemonCommand {
    program: String,
    extra: Vec<String>,
}

impl DefaultDaemonCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra: Vec::new(),
        }
    }

    pub fn from_config(cfg: &LaunchConfig) -> Self {
        Self {
            program: cfg.daemon_program.clone(),
            extra: cfg.daemon_args.clone(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra.extend(args.into_iter().map(Into::into));
        self
    }
}

impl DaemonCommand for DefaultDaemonCommand {
    fn build(&self, backend: &str, daemons: &Nspace) -> DaemonArgv {
        let mut argv = Vec::with_capacity(self.extra.len() + 7);
        argv.push(self.program.clone());
        argv.extend(self.extra.iter().cloned());
        argv.extend([
            "--launcher".to_string(),
            backend.to_string(),
            ARG_NSPACE.to_string(),
            daemons.to_string(),
            ARG_RANK.to_string(),
        ]);
        let rank_index = argv.len();
        argv.push(RANK_PLACEHOLDER.to_string());
        DaemonArgv::new(argv, rank_index)
    }
}
