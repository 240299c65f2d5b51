#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod firewall;
pub mod labels;
pub mod network;
pub mod policy;
pub mod tenant;

pub use k8s_openapi::{
    api::{
        core::v1::{Namespace, Pod},
        networking::v1::{
            IPBlock, NetworkPolicy, NetworkPolicyEgressRule, NetworkPolicyIngressRule,
            NetworkPolicyPeer, NetworkPolicyPort, NetworkPolicySpec,
        },
    },
    apimachinery::pkg::{apis::meta::v1::LabelSelector, util::intstr::IntOrString},
};
pub use kube::api::{ObjectMeta, ResourceExt};
