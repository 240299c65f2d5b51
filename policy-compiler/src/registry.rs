//! The resource-group registry: one resolver per symbolic group id, each
//! exposing up to three capabilities (firewall sets, firewall matches,
//! network-policy peers). A capability a group does not implement is
//! simply not applicable in that context, never an error.

use crate::sets;
use ahash::AHashMap as HashMap;
use peering_policy_compiler_core::{ClusterStateReader, CompileError, ResourceGroupId};
use peering_policy_compiler_k8s_api::{
    firewall::{Match, MatchOp, MatchPosition, Set, SetElement, SetKeyType},
    labels, IPBlock, IntOrString, LabelSelector, NetworkPolicyPeer, NetworkPolicyPort,
};
use std::sync::Arc;

/// Set holding the addresses of local pods eligible for offloading.
pub const VC_LOCAL_SET: &str = "vclocal";

/// Set holding the addresses of shadow pods mirroring the peer.
pub const VC_REMOTE_SET: &str = "vcremote";

/// Set holding the RFC1918 private ranges.
pub const PRIVATE_SUBNETS_SET: &str = "privatesubnets";

/// Set holding the peer cluster's pod CIDR.
pub const REMOTE_POD_CIDR_SET: &str = "remotepodcidr";

const PRIVATE_SUBNETS: [&str; 3] = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

/// A resource group's capabilities.
///
/// Implementations override only the outputs that apply to the group; the
/// defaults mean "not applicable in this context".
#[async_trait::async_trait]
pub trait GroupResolver: Send + Sync {
    /// Builds the firewall sets backing this group's matches.
    async fn build_sets(
        &self,
        _reader: &dyn ClusterStateReader,
        _cluster_id: &str,
    ) -> Result<Option<Vec<Set>>, CompileError> {
        Ok(None)
    }

    /// Builds the firewall matches selecting this group's traffic at the
    /// given position.
    fn firewall_matches(&self, _position: MatchPosition) -> Option<Vec<Match>> {
        None
    }

    /// Builds the `NetworkPolicy` peers and ports selecting this group.
    fn network_policy_peers(&self) -> Option<(Vec<NetworkPolicyPeer>, Vec<NetworkPolicyPort>)> {
        None
    }
}

/// Immutable mapping from resource-group id to resolver.
///
/// Built once at startup and never mutated afterwards; safe for unlimited
/// concurrent reads. A lookup miss is the compiler's single
/// `UnknownResourceGroup` failure mode.
pub struct Registry {
    resolvers: HashMap<ResourceGroupId, Arc<dyn GroupResolver>>,
}

// === impl Registry ===

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self {
            resolvers: HashMap::new(),
        };
        registry.register(
            ResourceGroupId::LOCAL_OFFLOADABLE_WORKLOADS,
            LocalOffloadableWorkloads,
        );
        registry.register(
            ResourceGroupId::REMOTE_SHADOW_WORKLOADS,
            RemoteShadowWorkloads,
        );
        registry.register(ResourceGroupId::PUBLIC_INTERNET, PublicInternet);
        registry.register(ResourceGroupId::NAMESERVER, Nameserver);
        registry.register(ResourceGroupId::OFFLOADED_WORKLOADS, OffloadedWorkloads);
        registry.register(ResourceGroupId::REMOTE_CLUSTER, RemoteCluster);
        registry
    }
}

impl Registry {
    pub fn register(
        &mut self,
        id: impl Into<ResourceGroupId>,
        resolver: impl GroupResolver + 'static,
    ) {
        self.resolvers.insert(id.into(), Arc::new(resolver));
    }

    pub fn resolver(&self, id: &ResourceGroupId) -> Result<&dyn GroupResolver, CompileError> {
        self.resolvers
            .get(id)
            .map(|resolver| &**resolver)
            .ok_or_else(|| CompileError::UnknownResourceGroup(id.clone()))
    }
}

/// Pods in offloading-enabled namespaces: the local workloads that could
/// be moved to a peer. Backed by a set because pod addresses are
/// dynamically allocated.
struct LocalOffloadableWorkloads;

#[async_trait::async_trait]
impl GroupResolver for LocalOffloadableWorkloads {
    async fn build_sets(
        &self,
        reader: &dyn ClusterStateReader,
        _cluster_id: &str,
    ) -> Result<Option<Vec<Set>>, CompileError> {
        let namespaces = reader
            .list_offloading_enabled_namespaces()
            .await
            .map_err(CompileError::ClusterStateUnavailable)?;

        let mut pods = Vec::new();
        for namespace in namespaces {
            let mut in_ns = reader
                .list_pods_in_namespace(&namespace)
                .await
                .map_err(CompileError::ClusterStateUnavailable)?;
            // Shadow pods in these namespaces belong to the remote side.
            in_ns.retain(|pod| !pod.shadow);
            pods.extend(in_ns);
        }

        Ok(Some(vec![sets::pod_ip_set(VC_LOCAL_SET, &pods)]))
    }

    fn firewall_matches(&self, position: MatchPosition) -> Option<Vec<Match>> {
        Some(vec![Match::ip(
            position,
            sets::reference(VC_LOCAL_SET),
            MatchOp::Eq,
        )])
    }
}

/// Shadow pods whose scheduling target is the peer cluster being compiled
/// for: the local mirror of everything offloaded there.
struct RemoteShadowWorkloads;

#[async_trait::async_trait]
impl GroupResolver for RemoteShadowWorkloads {
    async fn build_sets(
        &self,
        reader: &dyn ClusterStateReader,
        cluster_id: &str,
    ) -> Result<Option<Vec<Set>>, CompileError> {
        let mut pods = reader
            .list_shadow_pods()
            .await
            .map_err(CompileError::ClusterStateUnavailable)?;
        pods.retain(|pod| pod.target_cluster.as_deref() == Some(cluster_id));

        Ok(Some(vec![sets::pod_ip_set(VC_REMOTE_SET, &pods)]))
    }

    fn firewall_matches(&self, position: MatchPosition) -> Option<Vec<Match>> {
        Some(vec![Match::ip(
            position,
            sets::reference(VC_REMOTE_SET),
            MatchOp::Eq,
        )])
    }

    fn network_policy_peers(&self) -> Option<(Vec<NetworkPolicyPeer>, Vec<NetworkPolicyPort>)> {
        let selector = LabelSelector {
            match_labels: Some(
                [(
                    labels::SHADOW_POD.to_string(),
                    labels::SHADOW_POD_VALUE.to_string(),
                )]
                .into(),
            ),
            ..LabelSelector::default()
        };
        Some((
            vec![NetworkPolicyPeer {
                pod_selector: Some(selector),
                ..NetworkPolicyPeer::default()
            }],
            Vec::new(),
        ))
    }
}

/// Everything outside the RFC1918 private ranges.
struct PublicInternet;

#[async_trait::async_trait]
impl GroupResolver for PublicInternet {
    async fn build_sets(
        &self,
        _reader: &dyn ClusterStateReader,
        _cluster_id: &str,
    ) -> Result<Option<Vec<Set>>, CompileError> {
        Ok(Some(vec![Set {
            name: PRIVATE_SUBNETS_SET.to_string(),
            key_type: SetKeyType::IpCidr,
            elements: PRIVATE_SUBNETS
                .iter()
                .map(|cidr| SetElement {
                    key: cidr.to_string(),
                })
                .collect(),
        }]))
    }

    fn firewall_matches(&self, position: MatchPosition) -> Option<Vec<Match>> {
        Some(vec![Match::ip(
            position,
            sets::reference(PRIVATE_SUBNETS_SET),
            MatchOp::Neq,
        )])
    }

    fn network_policy_peers(&self) -> Option<(Vec<NetworkPolicyPeer>, Vec<NetworkPolicyPort>)> {
        Some((
            vec![NetworkPolicyPeer {
                ip_block: Some(IPBlock {
                    cidr: "0.0.0.0/0".to_string(),
                    except: Some(PRIVATE_SUBNETS.iter().map(|cidr| cidr.to_string()).collect()),
                }),
                ..NetworkPolicyPeer::default()
            }],
            Vec::new(),
        ))
    }
}

/// Any nameserver: traffic on port 53, regardless of peer.
struct Nameserver;

#[async_trait::async_trait]
impl GroupResolver for Nameserver {
    fn firewall_matches(&self, position: MatchPosition) -> Option<Vec<Match>> {
        Some(vec![Match::port(position, "53", MatchOp::Eq)])
    }

    fn network_policy_peers(&self) -> Option<(Vec<NetworkPolicyPeer>, Vec<NetworkPolicyPort>)> {
        let port = |protocol: &str| NetworkPolicyPort {
            port: Some(IntOrString::Int(53)),
            protocol: Some(protocol.to_string()),
            end_port: None,
        };
        Some((Vec::new(), vec![port("TCP"), port("UDP")]))
    }
}

/// Workloads delegated to this cluster by the peer. Carries no
/// capabilities: the network-policy compiler special-cases the id, and in
/// the firewall path the group is a documented no-op.
struct OffloadedWorkloads;

impl GroupResolver for OffloadedWorkloads {}

/// The peer cluster's whole pod CIDR, read from its Network record.
struct RemoteCluster;

#[async_trait::async_trait]
impl GroupResolver for RemoteCluster {
    async fn build_sets(
        &self,
        reader: &dyn ClusterStateReader,
        cluster_id: &str,
    ) -> Result<Option<Vec<Set>>, CompileError> {
        let cidr = reader
            .remote_cluster_pod_cidr(cluster_id)
            .await
            .map_err(CompileError::ClusterStateUnavailable)?;

        Ok(Some(vec![Set {
            name: REMOTE_POD_CIDR_SET.to_string(),
            key_type: SetKeyType::IpCidr,
            elements: vec![SetElement {
                key: cidr.to_string(),
            }],
        }]))
    }

    fn firewall_matches(&self, position: MatchPosition) -> Option<Vec<Match>> {
        Some(vec![Match::ip(
            position,
            sets::reference(REMOTE_POD_CIDR_SET),
            MatchOp::Eq,
        )])
    }
}
