use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Records the address block assigned to a cluster. The record named
/// `<cluster-id>-pod` in a peer's tenant namespace holds that peer's pod
/// CIDR.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "networking.peering.io",
    version = "v1alpha1",
    kind = "Network",
    namespaced,
    status = "NetworkStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    /// The requested address block.
    pub cidr: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// The block actually assigned, once any conflict remapping is done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}
