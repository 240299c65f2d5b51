//! The nftables-shaped firewall configuration enforced by the peering
//! gateway. The compiler produces these specs; the gateway data plane
//! applies them.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired firewall state for one gateway.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "networking.peering.io",
    version = "v1alpha1",
    kind = "FirewallConfiguration",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FirewallConfigurationSpec {
    pub table: Table,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub family: TableFamily,

    /// Named collections of addresses referenced by rule matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<Set>,

    pub chains: Vec<Chain>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TableFamily {
    Ipv4,
    Ipv6,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub name: String,
    pub r#type: ChainType,
    pub hook: ChainHook,

    /// Verdict for packets that reach the end of the chain.
    pub policy: ChainPolicy,

    /// Lower values run earlier.
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<FilterRule>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Filter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainHook {
    Prerouting,
    Input,
    Forward,
    Output,
    Postrouting,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainPolicy {
    Accept,
    Drop,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub name: String,
    pub action: FilterAction,

    /// Predicates AND-ed together; empty matches everything.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Accept,
    Drop,
}

/// One predicate. Exactly one of the optional fields is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default)]
    pub op: MatchOp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<MatchIp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<MatchPort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<MatchDev>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct_state: Option<MatchCtState>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchOp {
    #[default]
    Eq,
    Neq,
}

/// An address predicate: either a literal or a `@set` reference.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchIp {
    pub position: MatchPosition,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchPort {
    pub position: MatchPosition,
    pub value: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchPosition {
    Src,
    Dst,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchDev {
    pub position: MatchDevPosition,
    pub value: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchDevPosition {
    In,
    Out,
}

/// A connection-tracking state predicate.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchCtState {
    pub value: Vec<CtState>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CtState {
    Established,
    Related,
    New,
    Invalid,
}

/// A named, deduplicated collection of addresses or CIDR blocks.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub name: String,
    pub key_type: SetKeyType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<SetElement>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SetKeyType {
    IpAddr,
    IpCidr,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetElement {
    pub key: String,
}

// === impl Match ===

impl Match {
    pub fn ip(position: MatchPosition, value: impl Into<String>, op: MatchOp) -> Self {
        Self {
            op,
            ip: Some(MatchIp {
                position,
                value: value.into(),
            }),
            ..Self::default()
        }
    }

    pub fn port(position: MatchPosition, value: impl Into<String>, op: MatchOp) -> Self {
        Self {
            op,
            port: Some(MatchPort {
                position,
                value: value.into(),
            }),
            ..Self::default()
        }
    }

    pub fn dev(position: MatchDevPosition, value: impl Into<String>, op: MatchOp) -> Self {
        Self {
            op,
            dev: Some(MatchDev {
                position,
                value: value.into(),
            }),
            ..Self::default()
        }
    }

    pub fn ct_state(value: Vec<CtState>) -> Self {
        Self {
            op: MatchOp::Eq,
            ct_state: Some(MatchCtState { value }),
            ..Self::default()
        }
    }
}
