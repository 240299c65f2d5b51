use crate::ResourceGroupId;

/// Failures that abort a compile call.
///
/// Every variant is terminal: once one is raised, no partial firewall or
/// network-policy output is produced. The caller is expected to surface
/// the failure on the policy resource and retry the whole reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A party set both or neither of its namespace/group discriminators.
    #[error("party must set exactly one of namespace or group")]
    MalformedParty,

    /// A rule referenced a group with no registered resolver.
    #[error("unknown resource group {0}")]
    UnknownResourceGroup(ResourceGroupId),

    /// A tunnel policy or rule action was not an allow/deny value.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// A group with no network-policy peer capability was used opposite an
    /// offloaded-workloads side.
    #[error("resource group {0} cannot be used as a network policy peer")]
    UnsupportedPeerGroup(ResourceGroupId),

    /// An underlying cluster query failed.
    #[error("cluster state unavailable")]
    ClusterStateUnavailable(#[source] anyhow::Error),
}
