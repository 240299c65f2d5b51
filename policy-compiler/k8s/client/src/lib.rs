//! Kubernetes-backed implementation of the compiler's cluster-state
//! reader, translating each query into a single API server request.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use kube::{api::ListParams, Api, ResourceExt};
use peering_policy_compiler_core::{ClusterStateReader, IpNet, PodSnapshot};
use peering_policy_compiler_k8s_api::{labels, network::Network, tenant, Namespace, Pod};

/// Reads cluster state through a live `kube::Client`.
///
/// Each trait method issues one list or get. There is no caching and no
/// retrying here; a failed request surfaces as-is and the compiler aborts
/// that compile.
#[derive(Clone)]
pub struct KubeClusterStateReader {
    client: kube::Client,
}

// === impl KubeClusterStateReader ===

impl KubeClusterStateReader {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    async fn list_namespace_names(&self, selector: &str) -> Result<Vec<String>> {
        tracing::debug!(%selector, "listing namespaces");
        let namespaces = Api::<Namespace>::all(self.client.clone())
            .list(&ListParams::default().labels(selector))
            .await
            .with_context(|| format!("failed to list namespaces matching {selector}"))?;
        Ok(namespaces.into_iter().map(|ns| ns.name_any()).collect())
    }
}

#[async_trait::async_trait]
impl ClusterStateReader for KubeClusterStateReader {
    async fn list_pods_in_namespace(&self, namespace: &str) -> Result<Vec<PodSnapshot>> {
        tracing::debug!(%namespace, "listing pods");
        let pods = Api::<Pod>::namespaced(self.client.clone(), namespace)
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list pods in {namespace}"))?;
        Ok(pods.into_iter().map(snapshot).collect())
    }

    async fn list_shadow_pods(&self) -> Result<Vec<PodSnapshot>> {
        let selector = format!("{}={}", labels::SHADOW_POD, labels::SHADOW_POD_VALUE);
        tracing::debug!(%selector, "listing shadow pods");
        let pods = Api::<Pod>::all(self.client.clone())
            .list(&ListParams::default().labels(&selector))
            .await
            .context("failed to list shadow pods")?;
        Ok(pods.into_iter().map(snapshot).collect())
    }

    async fn list_offloading_enabled_namespaces(&self) -> Result<Vec<String>> {
        self.list_namespace_names(labels::OFFLOADING_ENABLED).await
    }

    async fn list_offloaded_namespaces(&self, cluster_id: &str) -> Result<Vec<String>> {
        // Tenant namespaces carry the remote cluster id too but never
        // receive compiled policies.
        let selector = format!(
            "{}={cluster_id},!{}",
            labels::REMOTE_CLUSTER_ID,
            labels::TENANT_NAMESPACE,
        );
        self.list_namespace_names(&selector).await
    }

    async fn remote_cluster_pod_cidr(&self, cluster_id: &str) -> Result<IpNet> {
        let namespace = tenant::namespace(cluster_id);
        let name = format!("{cluster_id}-pod");
        tracing::debug!(%namespace, %name, "fetching network record");
        let network = Api::<Network>::namespaced(self.client.clone(), &namespace)
            .get(&name)
            .await
            .with_context(|| format!("failed to get network {namespace}/{name}"))?;

        // The status carries the remapped block once allocation settles;
        // until then the requested block stands.
        let cidr = network
            .status
            .as_ref()
            .and_then(|status| status.cidr.clone())
            .unwrap_or_else(|| network.spec.cidr.clone());
        if cidr.is_empty() {
            return Err(anyhow!("network {namespace}/{name} has no cidr"));
        }
        cidr.parse()
            .with_context(|| format!("network {namespace}/{name} has invalid cidr {cidr:?}"))
    }
}

/// Projects a pod object down to the facts the compiler consumes.
fn snapshot(pod: Pod) -> PodSnapshot {
    let shadow = pod.labels().get(labels::SHADOW_POD).map(String::as_str)
        == Some(labels::SHADOW_POD_VALUE);
    // Shadow pods are bound to a virtual node named after the peer they
    // mirror.
    let target_cluster = shadow
        .then(|| pod.spec.as_ref().and_then(|spec| spec.node_name.clone()))
        .flatten();
    PodSnapshot {
        namespace: pod.namespace().unwrap_or_default(),
        ip: pod
            .status
            .as_ref()
            .and_then(|status| status.pod_ip.as_deref())
            .and_then(|ip| ip.parse().ok()),
        name: pod.name_any(),
        target_cluster,
        shadow,
    }
}
