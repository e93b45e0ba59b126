use std::str::FromStr;

use async_trait::async_trait;

use fleet_codec::{Data, DataType, Value};
use fleet_model::{Nspace, ProcName};

use crate::error::CoreError;

const KEY_CMD: &str = "cmd";
const KEY_NSPACE: &str = "nspace";
const KEY_SIGNAL: &str = "signal";
const KEY_PROC: &str = "proc";

/// Daemon command carried by a [`Directive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Exit,
    SignalLocalProcs,
    KillLocalProcs,
}

impl DirectiveKind {
    fn code(self) -> u8 {
        match self {
            DirectiveKind::Exit => 1,
            DirectiveKind::SignalLocalProcs => 2,
            DirectiveKind::KillLocalProcs => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(DirectiveKind::Exit),
            2 => Some(DirectiveKind::SignalLocalProcs),
            3 => Some(DirectiveKind::KillLocalProcs),
            _ => None,
        }
    }
}

/// Command broadcast to daemons, encoded as keyed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Directive {
    values: Vec<Value>,
}

impl Directive {
    fn with_kind(kind: DirectiveKind) -> Self {
        Self {
            values: vec![Value::keyed(KEY_CMD, Data::Uint8(kind.code()))],
        }
    }

    pub fn exit() -> Self {
        Self::with_kind(DirectiveKind::Exit)
    }

    /// Deliver `signal` to the local processes of `nspace`; the number is forwarded unchanged.
    pub fn signal(nspace: &Nspace, signal: i32) -> Self {
        let mut d = Self::with_kind(DirectiveKind::SignalLocalProcs);
        d.values
            .push(Value::keyed(KEY_NSPACE, Data::String(Some(nspace.to_string()))));
        d.values.push(Value::keyed(KEY_SIGNAL, Data::Int32(signal)));
        d
    }

    pub fn kill(procs: &[ProcName]) -> Self {
        let mut d = Self::with_kind(DirectiveKind::KillLocalProcs);
        d.values.extend(
            procs
                .iter()
                .map(|p| Value::keyed(KEY_PROC, Data::String(Some(p.to_string())))),
        );
        d
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn find(&self, key: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.key() == Some(key))
    }

    fn unload(value: &Value, ty: DataType) -> Option<Data> {
        let mut slot = Data::zeroed(ty);
        value.unload(Some(&mut slot), ty).ok()?;
        slot
    }

    pub fn kind(&self) -> Option<DirectiveKind> {
        match Self::unload(self.find(KEY_CMD)?, DataType::Uint8)? {
            Data::Uint8(code) => DirectiveKind::from_code(code),
            _ => None,
        }
    }

    pub fn nspace(&self) -> Option<Nspace> {
        match Self::unload(self.find(KEY_NSPACE)?, DataType::String)? {
            Data::String(Some(s)) => Some(Nspace::new(s)),
            _ => None,
        }
    }

    pub fn signal_number(&self) -> Option<i32> {
        match Self::unload(self.find(KEY_SIGNAL)?, DataType::Int32)? {
            Data::Int32(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn procs(&self) -> Vec<ProcName> {
        self.values
            .iter()
            .filter(|v| v.key() == Some(KEY_PROC))
            .filter_map(|v| match Self::unload(v, DataType::String)? {
                Data::String(Some(s)) => ProcName::from_str(&s).ok(),
                _ => None,
            })
            .collect()
    }
}

/// Channel from the launcher to its running daemons.
#[async_trait]
pub trait DaemonComm: Send + Sync {
    async fn start(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Send `directive` to every daemon.
    async fn broadcast(&self, directive: Directive) -> Result<(), CoreError>;
}
