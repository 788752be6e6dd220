//! Canonical, backend-agnostic model of a proxy fleet.
//!
//! One configuration describes proxy servers ([`Protocol`]), groups
//! ([`ProxyGroup`]), external providers ([`ProxyProvider`],
//! [`RuleProvider`]) and routing rules ([`Rule`]); backend crates
//! translate it into the native model of a concrete client engine. This
//! crate owns everything backend-independent:
//!
//! - the immutable value types and their shared field groups;
//! - the dispatch [`registry`] (tag → validating constructor);
//! - rule expansion ([`Rule::expand`]);
//! - the order-preserving member [`split`]ter;
//! - the [`TranslateError`] taxonomy and eager reference validation.
//!
//! Everything here is synchronous and pure: no I/O, no shared mutable
//! state, and identical inputs always produce identical outputs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod group;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod rule;
pub mod shared;
pub mod split;

pub use errors::{Backend, EntityKind, TranslateError};
pub use group::{GroupOptions, Member, ProxyGroup};
pub use protocol::{Protocol, ProtocolOptions};
pub use provider::{ProxyProvider, RuleProvider};
pub use registry::Registry;
pub use rule::{BasicRuleIR, Matcher, MatcherIR, Rule, RuleKind};

/// Policies understood by every backend without a definition.
const BUILTIN_POLICIES: [&str; 2] = ["direct", "reject"];

/// A complete canonical configuration.
///
/// Assembled by an external authoring layer; the translation engine never
/// reads files or the network itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CanonicalConfig {
    #[serde(default)]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub groups: Vec<ProxyGroup>,
    #[serde(default)]
    pub providers: Vec<ProxyProvider>,
    #[serde(default)]
    pub rule_providers: Vec<RuleProvider>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl CanonicalConfig {
    /// Eagerly validate cross-entity references.
    ///
    /// Names are the only cross-reference mechanism, resolved by plain
    /// string equality. This pass detects duplicate names, groups without
    /// members, dangling policy references and dangling bare-name group
    /// members; it is the explicit alternative to letting a dangling
    /// reference surface as a broken config at the client engine.
    ///
    /// Translation itself never consults a symbol table — a single entity
    /// can be translated without any config context.
    pub fn validate(&self) -> Result<(), Vec<TranslateError>> {
        let mut issues = Vec::new();
        let mut names: HashSet<&str> = HashSet::new();

        for name in self
            .protocols
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.groups.iter().map(|g| g.name.as_str()))
            .chain(self.providers.iter().map(|p| p.name.as_str()))
        {
            if !names.insert(name) {
                issues.push(TranslateError::MalformedReference {
                    name: name.to_string(),
                    referrer: "duplicate definition".to_string(),
                });
            }
        }

        // Entities carried inline inside group member lists are also
        // addressable by name.
        fn collect_inline<'a>(group: &'a ProxyGroup, names: &mut HashSet<&'a str>) {
            for member in &group.members {
                match member {
                    Member::Protocol(p) => {
                        names.insert(&p.name);
                    }
                    Member::Provider(p) => {
                        names.insert(&p.name);
                    }
                    Member::Group(g) => {
                        names.insert(&g.name);
                        collect_inline(g, names);
                    }
                    Member::Name(_) => {}
                }
            }
        }
        for group in &self.groups {
            collect_inline(group, &mut names);
        }

        for group in &self.groups {
            if group.members.is_empty() {
                issues.push(TranslateError::ValidationConflict {
                    backend: Backend::Clash,
                    kind: EntityKind::ProxyGroup,
                    entity: group.name.clone(),
                    reason: "a proxy group needs at least one member".to_string(),
                });
            }
            for member in &group.members {
                if let Member::Name(n) = member {
                    if !names.contains(n.as_str()) && !is_builtin_policy(n) {
                        issues.push(TranslateError::MalformedReference {
                            name: n.clone(),
                            referrer: format!("proxy-group `{}`", group.name),
                        });
                    }
                }
            }
        }

        for rule in &self.rules {
            if !names.contains(rule.policy.as_str()) && !is_builtin_policy(&rule.policy) {
                issues.push(TranslateError::MalformedReference {
                    name: rule.policy.clone(),
                    referrer: format!("{} rule", rule.kind.as_str()),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn is_builtin_policy(name: &str) -> bool {
    BUILTIN_POLICIES
        .iter()
        .any(|b| name.eq_ignore_ascii_case(b))
}
