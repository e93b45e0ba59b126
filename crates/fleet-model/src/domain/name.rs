use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Job namespace: the identity of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nspace(String);

impl Nspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generate a fresh namespace `{prefix}-{8 hex chars}@{job}`.
    pub fn generate(prefix: &str, job: u32) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}-{}@{job}", &id[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Nspace {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Rank of a process (or daemon) within its job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(pub u32);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified process name: namespace + rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcName {
    pub nspace: Nspace,
    pub rank: Rank,
}

impl ProcName {
    pub fn new(nspace: Nspace, rank: u32) -> Self {
        Self {
            nspace,
            rank: Rank(rank),
        }
    }
}

impl fmt::Display for ProcName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.nspace, self.rank)
    }
}

impl FromStr for ProcName {
    type Err = ModelError;

    /// Parse the `[nspace,rank]` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(|| ModelError::InvalidName(s.to_string()))?;
        let (nspace, rank) = inner
            .rsplit_once(',')
            .ok_or_else(|| ModelError::InvalidName(s.to_string()))?;
        let rank = rank
            .parse::<u32>()
            .map_err(|_| ModelError::InvalidName(s.to_string()))?;
        if nspace.is_empty() {
            return Err(ModelError::InvalidName(s.to_string()));
        }
        Ok(Self::new(Nspace::new(nspace), rank))
    }
}
