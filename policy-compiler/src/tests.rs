use super::*;
use crate::firewall::{CHAIN_NAME, TABLE_NAME};
use crate::registry::{PRIVATE_SUBNETS_SET, REMOTE_POD_CIDR_SET, VC_LOCAL_SET, VC_REMOTE_SET};
use maplit::{btreemap, hashmap};
use peering_policy_compiler_core::{ClusterStateReader, CompileError, IpNet, PodSnapshot};
use peering_policy_compiler_k8s_api::{
    firewall::{
        ChainHook, ChainPolicy, ChainType, CtState, FilterAction, FilterRule,
        FirewallConfigurationSpec, Match, MatchDevPosition, MatchOp, MatchPosition, SetElement,
        SetKeyType,
    },
    labels,
    policy::{PartySpec, PeeringPolicySpec, RuleSpec},
    IPBlock, IntOrString, LabelSelector, NetworkPolicyEgressRule, NetworkPolicyIngressRule,
    NetworkPolicyPeer, NetworkPolicyPort,
};
use std::collections::HashMap;

const CLUSTER: &str = "peer-a";

/// In-memory cluster state standing in for the API server.
#[derive(Default)]
struct FakeReader {
    pods: Vec<PodSnapshot>,
    offloading_enabled: Vec<String>,
    offloaded: HashMap<String, Vec<String>>,
    pod_cidrs: HashMap<String, IpNet>,
    unavailable: bool,
}

impl FakeReader {
    fn check(&self) -> anyhow::Result<()> {
        if self.unavailable {
            anyhow::bail!("api server unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClusterStateReader for FakeReader {
    async fn list_pods_in_namespace(&self, namespace: &str) -> anyhow::Result<Vec<PodSnapshot>> {
        self.check()?;
        Ok(self
            .pods
            .iter()
            .filter(|pod| pod.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn list_shadow_pods(&self) -> anyhow::Result<Vec<PodSnapshot>> {
        self.check()?;
        Ok(self.pods.iter().filter(|pod| pod.shadow).cloned().collect())
    }

    async fn list_offloading_enabled_namespaces(&self) -> anyhow::Result<Vec<String>> {
        self.check()?;
        Ok(self.offloading_enabled.clone())
    }

    async fn list_offloaded_namespaces(&self, cluster_id: &str) -> anyhow::Result<Vec<String>> {
        self.check()?;
        Ok(self.offloaded.get(cluster_id).cloned().unwrap_or_default())
    }

    async fn remote_cluster_pod_cidr(&self, cluster_id: &str) -> anyhow::Result<IpNet> {
        self.check()?;
        self.pod_cidrs
            .get(cluster_id)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no pod cidr recorded for {cluster_id}"))
    }
}

fn mk_pod(namespace: &str, name: &str, ip: Option<&str>) -> PodSnapshot {
    PodSnapshot {
        name: name.to_string(),
        namespace: namespace.to_string(),
        ip: ip.map(|ip| ip.parse().unwrap()),
        target_cluster: None,
        shadow: false,
    }
}

fn mk_shadow_pod(namespace: &str, name: &str, ip: Option<&str>, target: &str) -> PodSnapshot {
    PodSnapshot {
        target_cluster: Some(target.to_string()),
        shadow: true,
        ..mk_pod(namespace, name, ip)
    }
}

fn party_group(group: &str) -> PartySpec {
    PartySpec {
        group: Some(group.to_string()),
        ..PartySpec::default()
    }
}

fn party_ns(namespace: &str) -> PartySpec {
    PartySpec {
        namespace: Some(namespace.to_string()),
        ..PartySpec::default()
    }
}

fn mk_rule(action: &str, src: Option<PartySpec>, dst: Option<PartySpec>) -> RuleSpec {
    RuleSpec {
        src,
        dst,
        action: action.to_string(),
    }
}

fn mk_spec(tunnel_policy: &str, rules: Vec<RuleSpec>) -> PeeringPolicySpec {
    PeeringPolicySpec {
        tunnel_policy: tunnel_policy.to_string(),
        rules,
    }
}

async fn compile(
    reader: &FakeReader,
    spec: &PeeringPolicySpec,
) -> Result<CompiledPolicy, CompileError> {
    PolicyCompiler::default().compile(reader, spec, CLUSTER).await
}

fn filter_rules(firewall: &FirewallConfigurationSpec) -> &[FilterRule] {
    &firewall.table.chains[0].rules
}

fn set_names(firewall: &FirewallConfigurationSpec) -> Vec<&str> {
    firewall
        .table
        .sets
        .iter()
        .map(|set| set.name.as_str())
        .collect()
}

fn set_elements<'a>(firewall: &'a FirewallConfigurationSpec, name: &str) -> Vec<&'a str> {
    firewall
        .table
        .sets
        .iter()
        .find(|set| set.name == name)
        .unwrap_or_else(|| panic!("no set named {name}"))
        .elements
        .iter()
        .map(|element| element.key.as_str())
        .collect()
}

#[tokio::test]
async fn empty_policy_emits_only_the_preamble() {
    let reader = FakeReader::default();
    let compiled = compile(&reader, &mk_spec("allow", vec![])).await.unwrap();

    let table = &compiled.firewall.table;
    assert_eq!(table.name, TABLE_NAME);
    assert!(table.sets.is_empty());
    assert_eq!(table.chains.len(), 1);

    let chain = &table.chains[0];
    assert_eq!(chain.name, CHAIN_NAME);
    assert_eq!(chain.r#type, ChainType::Filter);
    assert_eq!(chain.hook, ChainHook::Postrouting);
    assert_eq!(chain.policy, ChainPolicy::Accept);
    assert_eq!(chain.priority, 200);

    assert_eq!(
        chain
            .rules
            .iter()
            .map(|rule| rule.name.as_str())
            .collect::<Vec<_>>(),
        vec![
            "allow-established-related",
            "match-tunnel-interface",
            "allow-external-egress",
        ],
    );
    assert!(chain.rules.iter().all(|rule| rule.action == FilterAction::Accept));
    assert_eq!(
        chain.rules[0].matches,
        vec![Match::ct_state(vec![CtState::Established, CtState::Related])],
    );
    assert_eq!(
        chain.rules[1].matches,
        vec![Match::dev(MatchDevPosition::In, "tunnel0", MatchOp::Neq)],
    );
    assert_eq!(
        chain.rules[2].matches,
        vec![Match::dev(MatchDevPosition::Out, "eth0", MatchOp::Eq)],
    );

    assert!(compiled.network_policies.is_empty());
}

#[tokio::test]
async fn tunnel_policy_maps_to_the_chain_policy() {
    let reader = FakeReader::default();
    let compiled = compile(&reader, &mk_spec("deny", vec![])).await.unwrap();
    assert_eq!(compiled.firewall.table.chains[0].policy, ChainPolicy::Drop);
}

#[tokio::test]
async fn rule_without_parties_matches_everything() {
    let reader = FakeReader::default();
    let compiled = compile(&reader, &mk_spec("allow", vec![mk_rule("deny", None, None)]))
        .await
        .unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[3].name, "rule-0");
    assert_eq!(rules[3].action, FilterAction::Drop);
    assert!(rules[3].matches.is_empty());
}

#[tokio::test]
async fn allows_remote_shadow_to_local_offloadable() {
    let reader = FakeReader {
        pods: vec![
            mk_pod("apps", "w-0", Some("10.1.0.7")),
            mk_pod("apps", "w-1", None),
            mk_shadow_pod("apps", "shadow-0", Some("10.2.0.9"), CLUSTER),
            mk_shadow_pod("apps", "shadow-1", Some("10.2.0.10"), "peer-b"),
        ],
        offloading_enabled: vec!["apps".to_string()],
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("remote-shadow-workloads")),
            Some(party_group("local-offloadable-workloads")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[3].action, FilterAction::Accept);
    assert_eq!(
        rules[3].matches,
        vec![
            Match::ip(MatchPosition::Src, "@vcremote", MatchOp::Eq),
            Match::ip(MatchPosition::Dst, "@vclocal", MatchOp::Eq),
        ],
    );

    assert_eq!(set_names(&compiled.firewall), vec![VC_REMOTE_SET, VC_LOCAL_SET]);
    // Only the shadow pod targeting this peer; addressless and non-shadow
    // pods stay out.
    assert_eq!(set_elements(&compiled.firewall, VC_REMOTE_SET), vec!["10.2.0.9"]);
    // Shadow pods are not local offloadable workloads even when they live
    // in an offloading-enabled namespace.
    assert_eq!(set_elements(&compiled.firewall, VC_LOCAL_SET), vec!["10.1.0.7"]);
}

#[tokio::test]
async fn denies_from_remote_shadow_leaving_destination_unconstrained() {
    let reader = FakeReader {
        pods: vec![mk_shadow_pod("apps", "shadow-0", Some("10.2.0.9"), CLUSTER)],
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "deny",
            Some(party_group("remote-shadow-workloads")),
            None,
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[3].action, FilterAction::Drop);
    assert_eq!(
        rules[3].matches,
        vec![Match::ip(MatchPosition::Src, "@vcremote", MatchOp::Eq)],
    );
    assert_eq!(set_names(&compiled.firewall), vec![VC_REMOTE_SET]);
}

#[tokio::test]
async fn preserves_rule_order_one_to_one() {
    let reader = FakeReader::default();
    let spec = mk_spec(
        "allow",
        vec![
            mk_rule("allow", Some(party_group("nameserver")), None),
            mk_rule("deny", None, Some(party_group("public-internet"))),
            mk_rule("allow", None, None),
        ],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(rules.len(), 6);
    assert_eq!(
        rules[3..]
            .iter()
            .map(|rule| (rule.name.as_str(), rule.action))
            .collect::<Vec<_>>(),
        vec![
            ("rule-0", FilterAction::Accept),
            ("rule-1", FilterAction::Drop),
            ("rule-2", FilterAction::Accept),
        ],
    );
}

#[tokio::test]
async fn materializes_each_referenced_set_once() {
    let reader = FakeReader {
        pods: vec![
            mk_pod("team-a", "w-0", Some("10.1.1.1")),
            mk_shadow_pod("apps", "shadow-0", Some("10.2.0.9"), CLUSTER),
        ],
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![
            mk_rule(
                "allow",
                Some(party_ns("team-a")),
                Some(party_group("remote-shadow-workloads")),
            ),
            mk_rule(
                "allow",
                Some(party_group("remote-shadow-workloads")),
                Some(party_ns("team-a")),
            ),
        ],
    );

    let compiled = compile(&reader, &spec).await.unwrap();
    assert_eq!(set_names(&compiled.firewall), vec!["ns-team-a", VC_REMOTE_SET]);
}

#[tokio::test]
async fn namespace_parties_match_their_pod_ip_set() {
    let reader = FakeReader {
        pods: vec![
            mk_pod("team-a", "w-0", Some("10.1.1.1")),
            mk_pod("team-a", "w-1", None),
        ],
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule("allow", None, Some(party_ns("team-a")))],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(
        rules[3].matches,
        vec![Match::ip(MatchPosition::Dst, "@ns-team-a", MatchOp::Eq)],
    );
    // Pods without an assigned address never land in a set.
    assert_eq!(set_elements(&compiled.firewall, "ns-team-a"), vec!["10.1.1.1"]);
    assert_eq!(
        compiled.firewall.table.sets[0].key_type,
        SetKeyType::IpAddr,
    );
}

#[tokio::test]
async fn public_internet_and_nameserver_are_self_contained() {
    let reader = FakeReader::default();
    let spec = mk_spec(
        "allow",
        vec![
            mk_rule("allow", None, Some(party_group("public-internet"))),
            mk_rule("allow", None, Some(party_group("nameserver"))),
        ],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(
        rules[3].matches,
        vec![Match::ip(MatchPosition::Dst, "@privatesubnets", MatchOp::Neq)],
    );
    assert_eq!(
        rules[4].matches,
        vec![Match::port(MatchPosition::Dst, "53", MatchOp::Eq)],
    );

    // The internet group carries a literal CIDR set; the nameserver group
    // needs none.
    assert_eq!(set_names(&compiled.firewall), vec![PRIVATE_SUBNETS_SET]);
    assert_eq!(
        set_elements(&compiled.firewall, PRIVATE_SUBNETS_SET),
        vec!["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"],
    );
    assert_eq!(
        compiled.firewall.table.sets[0].key_type,
        SetKeyType::IpCidr,
    );
}

#[tokio::test]
async fn remote_cluster_group_uses_the_recorded_pod_cidr() {
    let reader = FakeReader {
        pod_cidrs: hashmap! {
            CLUSTER.to_string() => "10.42.0.0/16".parse().unwrap(),
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule("allow", None, Some(party_group("remote-cluster")))],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let rules = filter_rules(&compiled.firewall);
    assert_eq!(
        rules[3].matches,
        vec![Match::ip(MatchPosition::Dst, "@remotepodcidr", MatchOp::Eq)],
    );
    assert_eq!(
        compiled.firewall.table.sets,
        vec![peering_policy_compiler_k8s_api::firewall::Set {
            name: REMOTE_POD_CIDR_SET.to_string(),
            key_type: SetKeyType::IpCidr,
            elements: vec![SetElement {
                key: "10.42.0.0/16".to_string()
            }],
        }],
    );
}

#[tokio::test]
async fn recompiling_an_unchanged_snapshot_is_identical() {
    let reader = FakeReader {
        pods: vec![
            mk_pod("team-a", "w-0", Some("10.1.1.1")),
            mk_shadow_pod("apps", "shadow-0", Some("10.2.0.9"), CLUSTER),
        ],
        offloading_enabled: vec!["apps".to_string()],
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string(), "beta".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![
            mk_rule(
                "allow",
                Some(party_group("remote-shadow-workloads")),
                Some(party_group("local-offloadable-workloads")),
            ),
            mk_rule("deny", Some(party_ns("team-a")), None),
            mk_rule(
                "allow",
                Some(party_group("offloaded-workloads")),
                Some(party_ns("team-a")),
            ),
        ],
    );

    let first = compile(&reader, &spec).await.unwrap();
    let second = compile(&reader, &spec).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_group_aborts_the_compile() {
    let reader = FakeReader::default();
    let spec = mk_spec(
        "allow",
        vec![mk_rule("allow", Some(party_group("blackhole")), None)],
    );

    let err = compile(&reader, &spec).await.unwrap_err();
    assert!(
        matches!(&err, CompileError::UnknownResourceGroup(id) if id.as_str() == "blackhole"),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn query_failures_abort_the_compile() {
    let reader = FakeReader {
        unavailable: true,
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("remote-shadow-workloads")),
            None,
        )],
    );

    let err = compile(&reader, &spec).await.unwrap_err();
    assert!(matches!(err, CompileError::ClusterStateUnavailable(_)));
}

#[tokio::test]
async fn malformed_parties_fail_before_any_query() {
    // The reader would fail if touched; validation must reject first.
    let reader = FakeReader {
        unavailable: true,
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(PartySpec {
                namespace: Some("team-a".to_string()),
                group: Some("nameserver".to_string()),
            }),
            None,
        )],
    );

    let err = compile(&reader, &spec).await.unwrap_err();
    assert!(matches!(err, CompileError::MalformedParty));
}

#[tokio::test]
async fn offloaded_source_becomes_egress_in_every_offloaded_namespace() {
    let reader = FakeReader {
        pods: vec![mk_pod("team-a", "w-0", Some("10.1.1.1"))],
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string(), "beta".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("offloaded-workloads")),
            Some(party_ns("team-a")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    // The offloaded side is a no-op for the firewall: the compiled rule
    // only constrains the namespace destination.
    let rules = filter_rules(&compiled.firewall);
    assert_eq!(
        rules[3].matches,
        vec![Match::ip(MatchPosition::Dst, "@ns-team-a", MatchOp::Eq)],
    );
    assert_eq!(set_names(&compiled.firewall), vec!["ns-team-a"]);

    assert_eq!(compiled.network_policies.len(), 2);
    for (output, namespace) in compiled.network_policies.iter().zip(["alpha", "beta"]) {
        assert_eq!(output.namespace, namespace);
        assert_eq!(output.spec.ingress, Some(vec![]));
        assert_eq!(
            output.spec.egress,
            Some(vec![NetworkPolicyEgressRule {
                to: Some(vec![NetworkPolicyPeer {
                    namespace_selector: Some(LabelSelector {
                        match_labels: Some(btreemap! {
                            labels::NAMESPACE_NAME.to_string() => "team-a".to_string(),
                        }),
                        ..LabelSelector::default()
                    }),
                    ..NetworkPolicyPeer::default()
                }]),
                ports: None,
            }]),
        );
    }
}

#[tokio::test]
async fn offloaded_destination_becomes_ingress_from_the_shadow_selector() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("remote-shadow-workloads")),
            Some(party_group("offloaded-workloads")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    assert_eq!(compiled.network_policies.len(), 1);
    let spec = &compiled.network_policies[0].spec;
    assert_eq!(spec.egress, Some(vec![]));
    assert_eq!(
        spec.ingress,
        Some(vec![NetworkPolicyIngressRule {
            from: Some(vec![NetworkPolicyPeer {
                pod_selector: Some(LabelSelector {
                    match_labels: Some(btreemap! {
                        labels::SHADOW_POD.to_string() => labels::SHADOW_POD_VALUE.to_string(),
                    }),
                    ..LabelSelector::default()
                }),
                ..NetworkPolicyPeer::default()
            }]),
            ports: None,
        }]),
    );
}

#[tokio::test]
async fn offloaded_namespaces_get_default_deny_without_relevant_rules() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule("allow", Some(party_group("nameserver")), None)],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    assert_eq!(compiled.network_policies.len(), 1);
    let spec = &compiled.network_policies[0].spec;
    assert_eq!(spec.ingress, Some(vec![]));
    assert_eq!(spec.egress, Some(vec![]));
    assert_eq!(
        spec.policy_types,
        Some(vec!["Ingress".to_string(), "Egress".to_string()]),
    );
}

#[tokio::test]
async fn rules_offloaded_on_both_sides_contribute_nothing() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("offloaded-workloads")),
            Some(party_group("offloaded-workloads")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();
    let spec = &compiled.network_policies[0].spec;
    assert_eq!(spec.ingress, Some(vec![]));
    assert_eq!(spec.egress, Some(vec![]));
}

#[tokio::test]
async fn nameserver_peer_carries_ports_without_peer_restriction() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("offloaded-workloads")),
            Some(party_group("nameserver")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    let port = |protocol: &str| NetworkPolicyPort {
        port: Some(IntOrString::Int(53)),
        protocol: Some(protocol.to_string()),
        end_port: None,
    };
    assert_eq!(
        compiled.network_policies[0].spec.egress,
        Some(vec![NetworkPolicyEgressRule {
            to: None,
            ports: Some(vec![port("TCP"), port("UDP")]),
        }]),
    );
}

#[tokio::test]
async fn public_internet_peer_excludes_private_ranges() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("offloaded-workloads")),
            Some(party_group("public-internet")),
        )],
    );

    let compiled = compile(&reader, &spec).await.unwrap();

    assert_eq!(
        compiled.network_policies[0].spec.egress,
        Some(vec![NetworkPolicyEgressRule {
            to: Some(vec![NetworkPolicyPeer {
                ip_block: Some(IPBlock {
                    cidr: "0.0.0.0/0".to_string(),
                    except: Some(vec![
                        "10.0.0.0/8".to_string(),
                        "172.16.0.0/12".to_string(),
                        "192.168.0.0/16".to_string(),
                    ]),
                }),
                ..NetworkPolicyPeer::default()
            }]),
            ports: None,
        }]),
    );
}

#[tokio::test]
async fn peer_incapable_group_opposite_an_offloaded_side_is_an_error() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        offloading_enabled: vec!["apps".to_string()],
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule(
            "allow",
            Some(party_group("local-offloadable-workloads")),
            Some(party_group("offloaded-workloads")),
        )],
    );

    let err = compile(&reader, &spec).await.unwrap_err();
    assert!(
        matches!(
            &err,
            CompileError::UnsupportedPeerGroup(id) if id.as_str() == "local-offloadable-workloads"
        ),
        "unexpected error: {err}",
    );
}

#[tokio::test]
async fn offloaded_side_without_an_opposite_party_is_malformed() {
    let reader = FakeReader {
        offloaded: hashmap! {
            CLUSTER.to_string() => vec!["alpha".to_string()],
        },
        ..FakeReader::default()
    };
    let spec = mk_spec(
        "allow",
        vec![mk_rule("allow", Some(party_group("offloaded-workloads")), None)],
    );

    let err = compile(&reader, &spec).await.unwrap_err();
    assert!(matches!(err, CompileError::MalformedParty));
}
