//! Compiles a policy's rules into the gateway firewall chain.

use crate::{
    cluster_info::ClusterInfo,
    registry::Registry,
    sets::{self, SetMaterializer, SetRef},
};
use peering_policy_compiler_core::{Action, ClusterStateReader, CompileError, Party, Policy};
use peering_policy_compiler_k8s_api::firewall::{
    Chain, ChainHook, ChainPolicy, ChainType, CtState, FilterAction, FilterRule,
    FirewallConfigurationSpec, Match, MatchDevPosition, MatchOp, MatchPosition, Table, TableFamily,
};

/// Name of the nftables table owned by the peering gateway.
pub const TABLE_NAME: &str = "cluster-connectivity";

/// Name of the filter chain holding the compiled rules.
pub const CHAIN_NAME: &str = "cluster-connectivity-filter";

/// Compiles the ordered firewall chain for one policy.
///
/// The chain starts with the fixed preamble, then carries exactly one
/// rule per policy rule in input order. The sets referenced by the
/// emitted matches are materialized afterwards, once per distinct group
/// or namespace.
pub async fn compile(
    reader: &dyn ClusterStateReader,
    registry: &Registry,
    info: &ClusterInfo,
    policy: &Policy,
    cluster_id: &str,
) -> Result<FirewallConfigurationSpec, CompileError> {
    let mut rules = preamble(info);

    // References are recorded in first-use order so repeated compiles of
    // the same policy emit sets in the same order.
    let mut used = Vec::new();

    for (i, rule) in policy.rules.iter().enumerate() {
        let mut matches = party_matches(registry, rule.source.as_ref(), MatchPosition::Src, &mut used)?;
        matches.extend(party_matches(
            registry,
            rule.destination.as_ref(),
            MatchPosition::Dst,
            &mut used,
        )?);

        rules.push(FilterRule {
            name: format!("rule-{i}"),
            action: match rule.action {
                Action::Allow => FilterAction::Accept,
                Action::Deny => FilterAction::Drop,
            },
            matches,
        });
    }

    let mut table_sets = Vec::new();
    let mut materializer = SetMaterializer::new(reader, registry);
    for set_ref in &used {
        table_sets.extend(materializer.materialize(set_ref, cluster_id).await?);
    }

    Ok(FirewallConfigurationSpec {
        table: Table {
            name: TABLE_NAME.to_string(),
            family: TableFamily::Ipv4,
            sets: table_sets,
            chains: vec![Chain {
                name: CHAIN_NAME.to_string(),
                r#type: ChainType::Filter,
                hook: ChainHook::Postrouting,
                policy: match policy.default_tunnel_action {
                    Action::Allow => ChainPolicy::Accept,
                    Action::Deny => ChainPolicy::Drop,
                },
                priority: info.chain_priority,
                rules,
            }],
        },
    })
}

/// The fixed rules preceding every compiled policy, built fresh per call:
/// keep established flows alive, pass anything that did not enter through
/// the tunnel, and pass egress on the external device.
fn preamble(info: &ClusterInfo) -> Vec<FilterRule> {
    vec![
        FilterRule {
            name: "allow-established-related".to_string(),
            action: FilterAction::Accept,
            matches: vec![Match::ct_state(vec![CtState::Established, CtState::Related])],
        },
        FilterRule {
            // Traffic that did not come in through the tunnel is out of
            // scope for peering policy; accepting it here means the
            // remaining rules only ever see tunnel ingress.
            name: "match-tunnel-interface".to_string(),
            action: FilterAction::Accept,
            matches: vec![Match::dev(
                MatchDevPosition::In,
                info.tunnel_device.clone(),
                MatchOp::Neq,
            )],
        },
        FilterRule {
            name: "allow-external-egress".to_string(),
            action: FilterAction::Accept,
            matches: vec![Match::dev(
                MatchDevPosition::Out,
                info.external_device.clone(),
                MatchOp::Eq,
            )],
        },
    ]
}

/// Resolves one side of a rule into its match predicates, recording the
/// sets it references. An absent party contributes no matches.
fn party_matches(
    registry: &Registry,
    party: Option<&Party>,
    position: MatchPosition,
    used: &mut Vec<SetRef>,
) -> Result<Vec<Match>, CompileError> {
    let Some(party) = party else {
        return Ok(Vec::new());
    };

    match party {
        Party::Namespace(namespace) => {
            used.push(SetRef::Namespace(namespace.clone()));
            Ok(vec![Match::ip(
                position,
                sets::reference(&sets::namespace_set_name(namespace)),
                MatchOp::Eq,
            )])
        }
        Party::Group(id) => {
            let resolver = registry.resolver(id)?;
            used.push(SetRef::Group(id.clone()));
            // Groups without a firewall capability (offloaded-workloads)
            // contribute no matches and no sets.
            Ok(resolver.firewall_matches(position).unwrap_or_default())
        }
    }
}
