use fleet_codec::Data;

use crate::{ATTR_LAUNCH_ID, Attributes, Flag, ProcName};

/// Per-node flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// A daemon is already running on this node.
    pub daemon_launched: Flag,
}

/// A cluster node and the daemon assigned to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub daemon: Option<ProcName>,
    pub flags: NodeFlags,
    pub attributes: Attributes,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Assign the daemon that will run on this node.
    pub fn with_daemon(mut self, daemon: ProcName) -> Self {
        self.daemon = Some(daemon);
        self
    }

    /// Attach the backend-specific launch target id.
    pub fn with_launch_id(mut self, id: i32) -> Self {
        self.attributes.insert(ATTR_LAUNCH_ID, Data::Int32(id));
        self
    }

    /// Mark this node as already running a daemon.
    pub fn with_daemon_launched(mut self) -> Self {
        self.flags.daemon_launched.set();
        self
    }

    /// Backend-specific launch target id, if one was assigned.
    pub fn launch_id(&self) -> Option<i32> {
        self.attributes.get_i32(ATTR_LAUNCH_ID)
    }

    pub fn daemon_launched(&self) -> bool {
        self.flags.daemon_launched.is_enabled()
    }
}

/// Ordered node assignment of one job plus the number of nodes that need a new daemon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobMap {
    nodes: Vec<Node>,
    num_new_daemons: usize,
}

impl JobMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from nodes, counting those without a running daemon.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut map = Self {
            nodes,
            num_new_daemons: 0,
        };
        map.recount();
        map
    }

    /// Append a node; counts it as new unless it already runs a daemon.
    pub fn push(&mut self, node: Node) {
        if !node.daemon_launched() {
            self.num_new_daemons += 1;
        }
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    pub fn num_new_daemons(&self) -> usize {
        self.num_new_daemons
    }

    /// Override the new-daemon count as computed by the mapper.
    pub fn set_num_new_daemons(&mut self, n: usize) {
        self.num_new_daemons = n;
    }

    /// Recompute the new-daemon count from node flags.
    pub fn recount(&mut self) {
        self.num_new_daemons = self.nodes.iter().filter(|n| !n.daemon_launched()).count();
    }
}
