//! Derives per-namespace `NetworkPolicy` specs from the rules that touch
//! the offloaded-workloads group.

use crate::registry::Registry;
use peering_policy_compiler_core::{ClusterStateReader, CompileError, Party, Policy};
use peering_policy_compiler_k8s_api::{
    labels, LabelSelector, NetworkPolicyEgressRule, NetworkPolicyIngressRule, NetworkPolicyPeer,
    NetworkPolicyPort, NetworkPolicySpec,
};

/// A `NetworkPolicy` spec bound to the namespace it must be applied in.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkPolicyOutput {
    pub namespace: String,
    pub spec: NetworkPolicySpec,
}

/// Compiles one `NetworkPolicy` spec per namespace currently offloaded to
/// the peer cluster.
///
/// Only rules with exactly one offloaded-workloads side are relevant: an
/// offloaded source becomes an egress entry toward the destination party,
/// an offloaded destination becomes an ingress entry from the source
/// party. Every offloaded namespace receives the same spec; with no
/// relevant rules that spec is empty, which enforces default-deny through
/// its declared policy types.
pub async fn compile(
    reader: &dyn ClusterStateReader,
    registry: &Registry,
    policy: &Policy,
    cluster_id: &str,
) -> Result<Vec<NetworkPolicyOutput>, CompileError> {
    let mut ingress = Vec::new();
    let mut egress = Vec::new();

    for rule in &policy.rules {
        let src_offloaded = is_offloaded(rule.source.as_ref());
        let dst_offloaded = is_offloaded(rule.destination.as_ref());

        match (src_offloaded, dst_offloaded) {
            (true, false) => {
                let (to, ports) = peer(registry, rule.destination.as_ref())?;
                egress.push(NetworkPolicyEgressRule { to, ports });
            }
            (false, true) => {
                let (from, ports) = peer(registry, rule.source.as_ref())?;
                ingress.push(NetworkPolicyIngressRule { from, ports });
            }
            // Rules touching neither or both sides contribute nothing;
            // the firewall path is responsible for them.
            _ => {}
        }
    }

    let spec = NetworkPolicySpec {
        pod_selector: LabelSelector::default(),
        ingress: Some(ingress),
        egress: Some(egress),
        policy_types: Some(vec!["Ingress".to_string(), "Egress".to_string()]),
    };

    let namespaces = reader
        .list_offloaded_namespaces(cluster_id)
        .await
        .map_err(CompileError::ClusterStateUnavailable)?;

    Ok(namespaces
        .into_iter()
        .map(|namespace| NetworkPolicyOutput {
            namespace,
            spec: spec.clone(),
        })
        .collect())
}

fn is_offloaded(party: Option<&Party>) -> bool {
    matches!(party, Some(Party::Group(id)) if id.is_offloaded_workloads())
}

/// Resolves the party opposite an offloaded side into peer selectors.
fn peer(
    registry: &Registry,
    party: Option<&Party>,
) -> Result<
    (
        Option<Vec<NetworkPolicyPeer>>,
        Option<Vec<NetworkPolicyPort>>,
    ),
    CompileError,
> {
    // An offloaded side needs a concrete opposite party to select on.
    let party = party.ok_or(CompileError::MalformedParty)?;

    match party {
        Party::Namespace(namespace) => {
            let selector = LabelSelector {
                match_labels: Some(
                    [(labels::NAMESPACE_NAME.to_string(), namespace.clone())].into(),
                ),
                ..LabelSelector::default()
            };
            Ok((
                Some(vec![NetworkPolicyPeer {
                    namespace_selector: Some(selector),
                    ..NetworkPolicyPeer::default()
                }]),
                None,
            ))
        }
        Party::Group(id) => {
            let (peers, ports) = registry
                .resolver(id)?
                .network_policy_peers()
                .ok_or_else(|| CompileError::UnsupportedPeerGroup(id.clone()))?;
            // Empty means unrestricted, which NetworkPolicy expresses by
            // omitting the field entirely.
            Ok((
                (!peers.is_empty()).then_some(peers),
                (!ports.is_empty()).then_some(ports),
            ))
        }
    }
}
