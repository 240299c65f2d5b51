//! Materializes the address sets referenced by compiled rules.

use crate::registry::Registry;
use ahash::AHashSet as HashSet;
use peering_policy_compiler_core::{
    ClusterStateReader, CompileError, PodSnapshot, ResourceGroupId,
};
use peering_policy_compiler_k8s_api::firewall::{Set, SetElement, SetKeyType};

/// Identity of a materialized set within one compile call. Deduplication
/// is by identity, never by content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SetRef {
    Group(ResourceGroupId),
    Namespace(String),
}

/// Builds each referenced set exactly once per compile call.
///
/// The cache is local to one invocation; nothing persists across compile
/// calls, so repeated re-compilation always observes fresh cluster state.
pub(crate) struct SetMaterializer<'a> {
    reader: &'a dyn ClusterStateReader,
    registry: &'a Registry,
    seen: HashSet<SetRef>,
}

// === impl SetMaterializer ===

impl<'a> SetMaterializer<'a> {
    pub(crate) fn new(reader: &'a dyn ClusterStateReader, registry: &'a Registry) -> Self {
        Self {
            reader,
            registry,
            seen: HashSet::new(),
        }
    }

    /// Returns the sets backing `set_ref`, or nothing when the reference
    /// was already materialized or needs no set (self-contained matches).
    pub(crate) async fn materialize(
        &mut self,
        set_ref: &SetRef,
        cluster_id: &str,
    ) -> Result<Vec<Set>, CompileError> {
        if !self.seen.insert(set_ref.clone()) {
            return Ok(Vec::new());
        }

        match set_ref {
            SetRef::Group(id) => {
                let resolver = self.registry.resolver(id)?;
                let sets = resolver.build_sets(self.reader, cluster_id).await?;
                Ok(sets.unwrap_or_default())
            }
            SetRef::Namespace(namespace) => {
                let pods = self
                    .reader
                    .list_pods_in_namespace(namespace)
                    .await
                    .map_err(CompileError::ClusterStateUnavailable)?;
                Ok(vec![pod_ip_set(&namespace_set_name(namespace), &pods)])
            }
        }
    }
}

/// Builds an address set from the pods that already have an address.
pub(crate) fn pod_ip_set(name: &str, pods: &[PodSnapshot]) -> Set {
    let elements = pods
        .iter()
        .filter_map(|pod| pod.ip)
        .map(|ip| SetElement {
            key: ip.to_string(),
        })
        .collect();

    Set {
        name: name.to_string(),
        key_type: SetKeyType::IpAddr,
        elements,
    }
}

pub(crate) fn namespace_set_name(namespace: &str) -> String {
    format!("ns-{namespace}")
}

/// Renders a set reference the way nftables matches expect it.
pub(crate) fn reference(name: &str) -> String {
    format!("@{name}")
}
