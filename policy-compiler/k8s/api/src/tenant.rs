//! Per-peer tenant namespace naming.

const PREFIX: &str = "tenant";

/// Returns the tenant namespace holding the peering resources for a
/// cluster.
pub fn namespace(cluster_id: &str) -> String {
    format!("{PREFIX}-{cluster_id}")
}

/// Extracts the cluster id a tenant namespace belongs to, if the name
/// follows the tenant pattern.
pub fn cluster_id(namespace: &str) -> Option<&str> {
    namespace
        .strip_prefix(PREFIX)?
        .strip_prefix('-')
        .filter(|id| !id.is_empty())
}
