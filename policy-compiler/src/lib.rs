//! Peering Policy Compiler
//!
//! Compiles a declarative cluster-peering connectivity policy into two
//! enforceable artifacts:
//!
//! - an ordered firewall chain spec (table, sets, rules) applied by the
//!   peering gateway, and
//! - namespace-scoped `NetworkPolicy` specs for every namespace whose
//!   workloads are offloaded to the peer.
//!
//! ```text
//! [ PeeringPolicy ] -> validate -> [ firewall ]  -> FirewallConfigurationSpec
//!                               \> [ netpol ]    -> NetworkPolicySpec per namespace
//! ```
//!
//! Both paths resolve symbolic rule parties through the resource-group
//! [`Registry`] and materialize the IP sets they reference from live
//! cluster state, read through a [`ClusterStateReader`] snapshot. The
//! compiler is a pure function of (policy, snapshot): it performs no
//! writes, keeps no state across calls, and returns nothing on failure.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cluster_info;
pub mod firewall;
pub mod forge;
pub mod netpol;
pub mod registry;
mod sets;
mod validation;

#[cfg(test)]
mod tests;

pub use self::{
    cluster_info::ClusterInfo,
    netpol::NetworkPolicyOutput,
    registry::{GroupResolver, Registry},
};
use peering_policy_compiler_core::{ClusterStateReader, CompileError};
use peering_policy_compiler_k8s_api as k8s;

/// Compiles `PeeringPolicy` specs for one local cluster.
///
/// Holds only immutable configuration; safe to share across tasks and to
/// use concurrently for different (policy, cluster id) pairs.
#[derive(Default)]
pub struct PolicyCompiler {
    registry: Registry,
    cluster: ClusterInfo,
}

/// The artifacts produced by one compile call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPolicy {
    pub firewall: k8s::firewall::FirewallConfigurationSpec,
    pub network_policies: Vec<NetworkPolicyOutput>,
}

// === impl PolicyCompiler ===

impl PolicyCompiler {
    pub fn new(cluster: ClusterInfo) -> Self {
        Self {
            registry: Registry::default(),
            cluster,
        }
    }

    /// Overrides the builtin resource-group registry.
    pub fn with_registry(registry: Registry, cluster: ClusterInfo) -> Self {
        Self { registry, cluster }
    }

    /// Compiles one policy against the given peer cluster.
    ///
    /// All-or-nothing: any validation failure, unknown group, or cluster
    /// query error aborts the call without partial output.
    pub async fn compile(
        &self,
        reader: &dyn ClusterStateReader,
        spec: &k8s::policy::PeeringPolicySpec,
        cluster_id: &str,
    ) -> Result<CompiledPolicy, CompileError> {
        let policy = validation::validate_policy(spec)?;

        let firewall =
            firewall::compile(reader, &self.registry, &self.cluster, &policy, cluster_id).await?;
        let network_policies = netpol::compile(reader, &self.registry, &policy, cluster_id).await?;

        Ok(CompiledPolicy {
            firewall,
            network_policies,
        })
    }
}
