//! Naming and labeling for the objects the caller persists.

use anyhow::{anyhow, Result};
use peering_policy_compiler_k8s_api::{labels, tenant};
use std::collections::BTreeMap;

/// Suffix appended to the cluster id to form the gateway firewall
/// configuration name.
const GATEWAY_RESOURCE_SUFFIX: &str = "connectivity-gateway";

/// Target value selecting the gateway data plane.
const GATEWAY_CATEGORY: &str = "gateway";

/// Name given to every compiled per-namespace `NetworkPolicy` object.
pub const NETWORK_POLICY_NAME: &str = "peering-connectivity";

/// Returns the name of the gateway `FirewallConfiguration` for a peer.
pub fn gateway_resource_name(cluster_id: &str) -> String {
    format!("{cluster_id}-{GATEWAY_RESOURCE_SUFFIX}")
}

/// Labels identifying a `FirewallConfiguration` as gateway-level
/// configuration for one peer.
pub fn gateway_labels(cluster_id: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            labels::FIREWALL_CATEGORY.to_string(),
            GATEWAY_CATEGORY.to_string(),
        ),
        (
            labels::FIREWALL_TARGET.to_string(),
            cluster_id.to_string(),
        ),
    ])
}

/// Returns the tenant namespace in which a peer's gateway configuration
/// is persisted.
pub fn gateway_namespace(cluster_id: &str) -> String {
    tenant::namespace(cluster_id)
}

/// Extracts the cluster id from a tenant namespace name.
pub fn extract_cluster_id(namespace: &str) -> Result<&str> {
    tenant::cluster_id(namespace)
        .ok_or_else(|| anyhow!("namespace {namespace:?} is not a tenant namespace"))
}
