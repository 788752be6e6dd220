//! Surge rules.
//!
//! One `KIND,matcher,policy` line per rule; IP-family rules append a
//! trailing `no-resolve` token when (and only when) the canonical flag is
//! explicitly `true`. Provider-backed matchers resolve to the provider's
//! declared URL — Surge fetches rule sets directly, there is no provider
//! section to reference by name.

use std::fmt;

use once_cell::sync::Lazy;

use px_model::errors::{Backend, EntityKind};
use px_model::rule::{BasicRuleIR, MatcherIR, Rule};
use px_model::{Registry, TranslateError};

const BACKEND: Backend = Backend::Surge;

/// One `[Rule]` section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurgeRule {
    /// Native uppercase tag, e.g. `DOMAIN-SUFFIX` or `FINAL`.
    pub tag: &'static str,
    /// Absent for the catch-all.
    pub matcher: Option<String>,
    pub policy: String,
    /// Copied verbatim; rendered only when `Some(true)`.
    pub no_resolve: Option<bool>,
}

impl fmt::Display for SurgeRule {
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

fn matcher_string(seed: &BasicRuleIR) -> Result<String, TranslateError> {
    match &seed.matcher {
        MatcherIR::Literal(m) => Ok(m.clone()),
        // Surge references external rule sets by URL, not by name.
        MatcherIR::Provider(p) => Ok(p.url.clone()),
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
        fn $fn_name(seed: &BasicRuleIR) -> Result<SurgeRule, TranslateError> {
            Ok(SurgeRule {
                tag: $tag,
                matcher: Some(matcher_string(seed)?),
                policy: seed.policy.clone(),
                no_resolve: seed.no_resolve,
            })
        }
    };
}

simple_rule!(domain, "DOMAIN");
simple_rule!(domain_suffix, "DOMAIN-SUFFIX");
simple_rule!(domain_keyword, "DOMAIN-KEYWORD");
simple_rule!(domain_set, "DOMAIN-SET");
simple_rule!(ip_cidr, "IP-CIDR");
simple_rule!(ip_cidr6, "IP-CIDR6");
simple_rule!(geoip, "GEOIP");
simple_rule!(ip_asn, "IP-ASN");
simple_rule!(user_agent, "USER-AGENT");
simple_rule!(url_regex, "URL-REGEX");
simple_rule!(process_name, "PROCESS-NAME");
simple_rule!(dest_port, "DEST-PORT");
simple_rule!(src_port, "SRC-PORT");
simple_rule!(src_ip, "SRC-IP");
simple_rule!(protocol, "PROTOCOL");
simple_rule!(rule_set, "RULE-SET");

fn final_rule(seed: &BasicRuleIR) -> Result<SurgeRule, TranslateError> {
    Ok(SurgeRule {
        tag: "FINAL",
        matcher: None,
        policy: seed.policy.clone(),
        no_resolve: None,
    })
}

/// Rule dispatch table for Surge; every canonical rule kind maps.
pub static RULES: Lazy<Registry<BasicRuleIR, SurgeRule>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::Rule)
        .with("domain", domain)
        .with("domain-suffix", domain_suffix)
        .with("domain-keyword", domain_keyword)
        .with("domain-set", domain_set)
        .with("ip-cidr", ip_cidr)
        .with("ip-cidr6", ip_cidr6)
        .with("geoip", geoip)
        .with("ip-asn", ip_asn)
        .with("user-agent", user_agent)
        .with("url-regex", url_regex)
        .with("process-name", process_name)
        .with("dest-port", dest_port)
        .with("src-port", src_port)
        .with("src-ip", src_ip)
        .with("protocol", protocol)
        .with("rule-set", rule_set)
        .with("final", final_rule)
});

/// Translate one canonical rule into its ordered Surge expansion.
pub fn rules_from_canonical(rule: &Rule) -> Result<Vec<SurgeRule>, TranslateError> {
    rule.expand(BACKEND)?
        .iter()
        .map(|seed| RULES.construct(seed.kind.as_str(), seed))
        .collect()
}
