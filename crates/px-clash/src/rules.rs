//! Clash classical rules.
//!
//! Each rule renders to one classical line `KIND,matcher,policy` with an
//! optional trailing `no-resolve` token; the catch-all renders as
//! `MATCH,policy`. Provider-backed matchers reference the rule provider
//! by *name* (Clash resolves it against `rule-providers`).

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

use px_model::errors::{Backend, EntityKind};
use px_model::rule::{BasicRuleIR, MatcherIR, Rule};
use px_model::{Registry, TranslateError};

const BACKEND: Backend = Backend::Clash;

/// One Clash rule, already resolved to its native tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClashRule {
    /// Native uppercase tag, e.g. `DOMAIN-SUFFIX` or `MATCH`.
    pub tag: &'static str,
    /// Absent for the catch-all.
    pub matcher: Option<String>,
    pub policy: String,
    /// Copied verbatim from the canonical rule; rendered only when
    /// `Some(true)`, but `Some(false)` stays distinct from `None`.
    pub no_resolve: Option<bool>,
}

impl fmt::Display for ClashRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            Some(matcher) => {
                write!(f, "{},{},{}", self.tag, matcher, self.policy)?;
                if self.no_resolve == Some(true) {
                    f.write_str(",no-resolve")?;
                }
                Ok(())
            }
            None => write!(f, "{},{}", self.tag, self.policy),
        }
    }
}

impl Serialize for ClashRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn literal(seed: &BasicRuleIR) -> Result<String, TranslateError> {
    match &seed.matcher {
        MatcherIR::Literal(m) => Ok(m.clone()),
        MatcherIR::Provider(p) => Ok(p.name.clone()),
        MatcherIR::None => Err(TranslateError::ValidationConflict {
            backend: BACKEND,
            kind: EntityKind::Rule,
            entity: format!("{} -> {}", seed.kind.as_str(), seed.policy),
            reason: "missing matcher".to_string(),
        }),
    }
}

macro_rules! simple_rule {
    ($fn_name:ident, $tag:literal) => {
        fn $fn_name(seed: &BasicRuleIR) -> Result<ClashRule, TranslateError> {
            Ok(ClashRule {
                tag: $tag,
                matcher: Some(literal(seed)?),
                policy: seed.policy.clone(),
                no_resolve: seed.no_resolve,
            })
        }
    };
}

simple_rule!(domain, "DOMAIN");
simple_rule!(domain_suffix, "DOMAIN-SUFFIX");
simple_rule!(domain_keyword, "DOMAIN-KEYWORD");
simple_rule!(ip_cidr, "IP-CIDR");
simple_rule!(ip_cidr6, "IP-CIDR6");
simple_rule!(geoip, "GEOIP");
simple_rule!(process_name, "PROCESS-NAME");
simple_rule!(dest_port, "DST-PORT");
simple_rule!(src_port, "SRC-PORT");
simple_rule!(src_ip, "SRC-IP-CIDR");
simple_rule!(rule_set, "RULE-SET");

fn final_rule(seed: &BasicRuleIR) -> Result<ClashRule, TranslateError> {
    Ok(ClashRule {
        tag: "MATCH",
        matcher: None,
        policy: seed.policy.clone(),
        no_resolve: None,
    })
}

/// Rule dispatch table for Clash. domain-set, ip-asn, user-agent,
/// url-regex and protocol rules have no classical counterpart here.
pub static RULES: Lazy<Registry<BasicRuleIR, ClashRule>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::Rule)
        .with("domain", domain)
        .with("domain-suffix", domain_suffix)
        .with("domain-keyword", domain_keyword)
        .with("ip-cidr", ip_cidr)
        .with("ip-cidr6", ip_cidr6)
        .with("geoip", geoip)
        .with("process-name", process_name)
        .with("dest-port", dest_port)
        .with("src-port", src_port)
        .with("src-ip", src_ip)
        .with("rule-set", rule_set)
        .with("final", final_rule)
});

/// Translate one canonical rule into its ordered Clash expansion.
///
/// Group rules yield one line per matcher element; the output is never
/// empty and an unsupported discriminant is a hard error, never a skip.
pub fn rules_from_canonical(rule: &Rule) -> Result<Vec<ClashRule>, TranslateError> {
    rule.expand(BACKEND)?
        .iter()
        .map(|seed| RULES.construct(seed.kind.as_str(), seed))
        .collect()
}
