use anyhow::Result;
use ipnet::IpNet;
use std::net::IpAddr;

/// A point-in-time view of one pod.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,

    /// The pod's address. Unset until the network plugin has assigned one.
    pub ip: Option<IpAddr>,

    /// The peer cluster the pod is scheduled to, when offloaded.
    pub target_cluster: Option<String>,

    /// Whether this pod is a local stand-in for a workload running on a
    /// peer cluster.
    pub shadow: bool,
}

/// Read-only cluster facts consumed by the compiler.
///
/// The compiler treats each call as a single synchronous query: no
/// internal retries, no caching across compile calls. A failed query
/// aborts the current compile wholesale.
#[async_trait::async_trait]
pub trait ClusterStateReader: Send + Sync {
    async fn list_pods_in_namespace(&self, namespace: &str) -> Result<Vec<PodSnapshot>>;

    /// Lists the local stand-ins for pods offloaded to peer clusters.
    async fn list_shadow_pods(&self) -> Result<Vec<PodSnapshot>>;

    /// Lists namespaces flagged for offloading.
    async fn list_offloading_enabled_namespaces(&self) -> Result<Vec<String>>;

    /// Lists namespaces whose workloads are currently offloaded to the
    /// given peer cluster.
    async fn list_offloaded_namespaces(&self, cluster_id: &str) -> Result<Vec<String>>;

    /// Fetches the pod CIDR assigned to the given peer cluster.
    async fn remote_cluster_pod_cidr(&self, cluster_id: &str) -> Result<IpNet>;
}
