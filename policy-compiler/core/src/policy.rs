use crate::CompileError;
use std::{fmt, str::FromStr};

/// Whether matching traffic passes through the tunnel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Allow,
    Deny,
}

/// Identifies a pluggable category of traffic endpoints.
///
/// Ids are opaque to the rest of the compiler: a group's meaning lives
/// entirely in its registered resolver, and an id without one fails
/// compilation with [`CompileError::UnknownResourceGroup`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceGroupId(String);

/// One side of a connectivity rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Party {
    /// All pods in a raw namespace.
    Namespace(String),

    /// A symbolic resource group resolved against live cluster state.
    Group(ResourceGroupId),
}

/// One connectivity rule. An absent party matches all traffic on that
/// side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub source: Option<Party>,
    pub destination: Option<Party>,
}

/// A validated peering policy. Rule order is significant: enforcement is
/// first-match-wins, and compilation preserves the order exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    pub default_tunnel_action: Action,
    pub rules: Vec<Rule>,
}

// === impl Action ===

impl FromStr for Action {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            s => Err(CompileError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => "allow".fmt(f),
            Self::Deny => "deny".fmt(f),
        }
    }
}

// === impl ResourceGroupId ===

impl ResourceGroupId {
    /// Pods in namespaces flagged for offloading, i.e. workloads that
    /// could be moved to a peer.
    pub const LOCAL_OFFLOADABLE_WORKLOADS: &'static str = "local-offloadable-workloads";

    /// Local stand-ins for pods running on a given peer cluster.
    pub const REMOTE_SHADOW_WORKLOADS: &'static str = "remote-shadow-workloads";

    /// Everything outside the RFC1918 private ranges.
    pub const PUBLIC_INTERNET: &'static str = "public-internet";

    /// Any nameserver, i.e. port 53 traffic.
    pub const NAMESERVER: &'static str = "nameserver";

    /// Workloads delegated to this cluster by a peer. Meaningful only to
    /// the network-policy compiler.
    pub const OFFLOADED_WORKLOADS: &'static str = "offloaded-workloads";

    /// The peer cluster's whole pod CIDR.
    pub const REMOTE_CLUSTER: &'static str = "remote-cluster";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_offloaded_workloads(&self) -> bool {
        self.0 == Self::OFFLOADED_WORKLOADS
    }
}

impl From<&str> for ResourceGroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourceGroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
