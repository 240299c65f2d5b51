//! Structural validation of `PeeringPolicy` specs.

use peering_policy_compiler_core::{CompileError, Party, Policy, Rule};
use peering_policy_compiler_k8s_api::policy::{PartySpec, PeeringPolicySpec, RuleSpec};

/// Checks a spec structurally and lowers it into the core model.
///
/// Runs before any cluster query is issued, so malformed parties and
/// unknown actions fail fast without side effects.
pub(crate) fn validate_policy(spec: &PeeringPolicySpec) -> Result<Policy, CompileError> {
    let default_tunnel_action = spec.tunnel_policy.parse()?;
    let rules = spec
        .rules
        .iter()
        .map(validate_rule)
        .collect::<Result<_, _>>()?;

    Ok(Policy {
        default_tunnel_action,
        rules,
    })
}

fn validate_rule(rule: &RuleSpec) -> Result<Rule, CompileError> {
    Ok(Rule {
        action: rule.action.parse()?,
        source: rule.src.as_ref().map(validate_party).transpose()?,
        destination: rule.dst.as_ref().map(validate_party).transpose()?,
    })
}

fn validate_party(party: &PartySpec) -> Result<Party, CompileError> {
    // An empty string is as good as unset; a party declaring `namespace: ""`
    // must not silently match everything.
    let namespace = party.namespace.as_deref().filter(|ns| !ns.is_empty());
    let group = party.group.as_deref().filter(|group| !group.is_empty());

    match (namespace, group) {
        (Some(namespace), None) => Ok(Party::Namespace(namespace.to_string())),
        (None, Some(group)) => Ok(Party::Group(group.into())),
        _ => Err(CompileError::MalformedParty),
    }
}
