//! Canonical routing rules and the rule-expansion step.
//!
//! A [`Rule`] pairs a closed [`RuleKind`] discriminant with a
//! [`Matcher`] shape: a single literal (*basic* rule), a list of literals
//! (*group* rule, expanded into N basic rules sharing one policy), or a
//! rule-provider reference. A *final* rule carries no matcher at all.
//!
//! [`Rule::expand`] normalizes any shape into ordered [`BasicRuleIR`]
//! seeds; backend rule registries then map each seed to one native rule.

use serde::{Deserialize, Serialize};

use crate::errors::{Backend, EntityKind, TranslateError};
use crate::provider::RuleProvider;

/// Closed set of rule discriminants.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Domain,
    DomainSuffix,
    DomainKeyword,
    DomainSet,
    IpCidr,
    IpCidr6,
    Geoip,
    IpAsn,
    UserAgent,
    UrlRegex,
    ProcessName,
    DestPort,
    SrcPort,
    SrcIp,
    Protocol,
    RuleSet,
    Final,
}

impl RuleKind {
    /// Canonical tag string; the dispatch key for rule registries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Domain => "domain",
            RuleKind::DomainSuffix => "domain-suffix",
            RuleKind::DomainKeyword => "domain-keyword",
            RuleKind::DomainSet => "domain-set",
            RuleKind::IpCidr => "ip-cidr",
            RuleKind::IpCidr6 => "ip-cidr6",
            RuleKind::Geoip => "geoip",
            RuleKind::IpAsn => "ip-asn",
            RuleKind::UserAgent => "user-agent",
            RuleKind::UrlRegex => "url-regex",
            RuleKind::ProcessName => "process-name",
            RuleKind::DestPort => "dest-port",
            RuleKind::SrcPort => "src-port",
            RuleKind::SrcIp => "src-ip",
            RuleKind::Protocol => "protocol",
            RuleKind::RuleSet => "rule-set",
            RuleKind::Final => "final",
        }
    }

    /// IP-CIDR-family kinds carry the `no_resolve` flag.
    #[must_use]
    pub fn ip_family(&self) -> bool {
        matches!(
            self,
            RuleKind::IpCidr | RuleKind::IpCidr6 | RuleKind::Geoip | RuleKind::IpAsn
        )
    }

    /// Kinds whose matcher may reference a rule provider.
    #[must_use]
    pub fn provider_capable(&self) -> bool {
        matches!(self, RuleKind::RuleSet | RuleKind::DomainSet)
    }
}

/// Matcher shape of a canonical rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Matcher {
    Literal(String),
    List(Vec<String>),
    Provider(RuleProvider),
}

/// One canonical routing rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Absent only for `final` rules.
    #[serde(default)]
    pub matcher: Option<Matcher>,
    /// Name of the protocol or group that matching traffic routes to.
    pub policy: String,
    /// IP-CIDR family only. `None` means "author said nothing": backends
    /// emit the flag only for `Some(true)` and keep `Some(false)`
    /// distinct — the flag is never invented or dropped.
    #[serde(default)]
    pub no_resolve: Option<bool>,
}

impl Rule {
    /// Basic rule with a single literal matcher.
    #[must_use]
    pub fn basic(kind: RuleKind, matcher: impl Into<String>, policy: impl Into<String>) -> Self {
        Rule {
            kind,
            matcher: Some(Matcher::Literal(matcher.into())),
            policy: policy.into(),
            no_resolve: None,
        }
    }

    /// Group rule: a list matcher expanded into one basic rule per element.
    #[must_use]
    pub fn group(
        kind: RuleKind,
        matchers: impl IntoIterator<Item = impl Into<String>>,
        policy: impl Into<String>,
    ) -> Self {
        Rule {
            kind,
            matcher: Some(Matcher::List(
                matchers.into_iter().map(Into::into).collect(),
            )),
            policy: policy.into(),
            no_resolve: None,
        }
    }

    /// Rule backed by an external rule provider.
    #[must_use]
    pub fn from_provider(kind: RuleKind, provider: RuleProvider, policy: impl Into<String>) -> Self {
        Rule {
            kind,
            matcher: Some(Matcher::Provider(provider)),
            policy: policy.into(),
            no_resolve: None,
        }
    }

    /// Catch-all rule; no matcher, only a policy.
    #[must_use]
    pub fn final_rule(policy: impl Into<String>) -> Self {
        Rule {
            kind: RuleKind::Final,
            matcher: None,
            policy: policy.into(),
            no_resolve: None,
        }
    }

    #[must_use]
    pub fn with_no_resolve(mut self, no_resolve: bool) -> Self {
        self.no_resolve = Some(no_resolve);
        self
    }

    /// Expand into ordered basic seeds.
    ///
    /// - basic rule → exactly one seed with the same discriminant/matcher;
    /// - group rule with N matchers → exactly N seeds, in original order,
    ///   all sharing this rule's policy;
    /// - final rule → exactly one catch-all seed.
    ///
    /// The result is never empty; a group rule with an empty matcher list
    /// is rejected rather than silently dropped.
    pub fn expand(&self, backend: Backend) -> Result<Vec<BasicRuleIR>, TranslateError> {
        let seed = |matcher: MatcherIR| BasicRuleIR {
            kind: self.kind,
            matcher,
            policy: self.policy.clone(),
            no_resolve: self.no_resolve,
        };

        match (&self.kind, &self.matcher) {
            (RuleKind::Final, None) => Ok(vec![seed(MatcherIR::None)]),
            (RuleKind::Final, Some(_)) => Err(self.shape_error(backend, "final rule takes no matcher")),
            (_, None) => Err(self.shape_error(backend, "missing matcher")),
            (_, Some(Matcher::Literal(m))) => Ok(vec![seed(MatcherIR::Literal(m.clone()))]),
            (_, Some(Matcher::List(ms))) => {
                if ms.is_empty() {
                    return Err(self.shape_error(backend, "group rule with empty matcher list"));
                }
                Ok(ms
                    .iter()
                    .map(|m| seed(MatcherIR::Literal(m.clone())))
                    .collect())
            }
            (kind, Some(Matcher::Provider(p))) => {
                if !kind.provider_capable() {
                    return Err(self.shape_error(
                        backend,
                        "only rule-set and domain-set rules may reference a rule provider",
                    ));
                }
                Ok(vec![seed(MatcherIR::Provider(p.clone()))])
            }
        }
    }

    fn shape_error(&self, backend: Backend, reason: &str) -> TranslateError {
        TranslateError::ValidationConflict {
            backend,
            kind: EntityKind::Rule,
            entity: format!("{} -> {}", self.kind.as_str(), self.policy),
            reason: reason.to_string(),
        }
    }
}

/// Matcher of an expanded seed.
///
/// Provider-backed matchers stay symbolic: each backend resolves them to
/// its own native reference (Surge uses the provider URL, Clash the
/// provider name), never to an inline literal.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherIR {
    Literal(String),
    Provider(RuleProvider),
    /// Catch-all; `final` only.
    None,
}

/// One expanded basic rule, ready for registry dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicRuleIR {
    pub kind: RuleKind,
    pub matcher: MatcherIR,
    pub policy: String,
    pub no_resolve: Option<bool>,
}
