//! Well-known label keys shared by the compiler and the data plane.

/// Marks a pod as a local stand-in for a workload running on a peer.
pub const SHADOW_POD: &str = "policy.peering.io/shadow-pod";
pub const SHADOW_POD_VALUE: &str = "true";

/// Flags a namespace whose workloads may be offloaded to peers.
pub const OFFLOADING_ENABLED: &str = "policy.peering.io/offloading-enabled";

/// Records the peer cluster a namespace is offloaded to.
pub const REMOTE_CLUSTER_ID: &str = "policy.peering.io/remote-cluster-id";

/// Marks per-peer tenant namespaces. These hold peering resources and
/// never receive compiled policies.
pub const TENANT_NAMESPACE: &str = "policy.peering.io/tenant-namespace";

/// Selects which data-plane component consumes a firewall configuration.
pub const FIREWALL_CATEGORY: &str = "networking.peering.io/firewall-category";

/// Restricts a firewall configuration to a single peer gateway.
pub const FIREWALL_TARGET: &str = "networking.peering.io/firewall-target";

/// Kubernetes' own immutable namespace name label.
pub const NAMESPACE_NAME: &str = "kubernetes.io/metadata.name";
