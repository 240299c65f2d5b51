use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declares allow/deny connectivity rules for one cluster peering.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "policy.peering.io",
    version = "v1alpha1",
    kind = "PeeringPolicy",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PeeringPolicySpec {
    /// Base chain policy applied to tunnel traffic that matches no rule.
    #[serde(default = "default_tunnel_policy")]
    pub tunnel_policy: String,

    /// Ordered, first-match-wins connectivity rules.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One connectivity rule between two traffic parties.
///
/// Action and group values are free-form strings on purpose: an unknown
/// value must surface as a compile failure reported on the resource
/// status, not as a deserialization error that hides the object entirely.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct RuleSpec {
    /// The party initiating the traffic. Absent means any source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<PartySpec>,

    /// The party receiving the traffic. Absent means any destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<PartySpec>,

    /// `allow` or `deny`.
    pub action: String,
}

/// One side of a rule: a raw namespace or a symbolic resource group.
/// Exactly one of the two must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct PartySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn default_tunnel_policy() -> String {
    "allow".to_string()
}
