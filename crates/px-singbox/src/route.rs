//! sing-box route section: rules, rule sets and the default outbound.

use once_cell::sync::Lazy;
use serde::Serialize;

use px_model::errors::{Backend, EntityKind};
use px_model::provider::RuleProvider;
use px_model::rule::{BasicRuleIR, MatcherIR, Rule};
use px_model::{Registry, TranslateError};

const BACKEND: Backend = Backend::SingBox;

/// One matching rule of `route.rules`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RouteRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_suffix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_keyword: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_cidr: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_ip_cidr: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port: Vec<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_port: Vec<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub process_name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_set: Vec<String>,
    pub outbound: String,
}

/// Translation of one canonical rule: either a matching rule or the
/// route-level default (`final` has no matcher and becomes `route.final`,
/// not an entry in `route.rules`).
#[derive(Debug, Clone, PartialEq)]
pub enum SingBoxRule {
    Match(RouteRule),
    Default { outbound: String },
}

/// One entry of `route.rule_set`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleSet {
    Remote {
        tag: String,
        url: String,
        format: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        update_interval: Option<String>,
    },
    Local {
        tag: String,
        path: String,
        format: &'static str,
    },
}

/// Build the `route.rule_set` entry for one canonical rule provider.
#[must_use]
pub fn rule_set_from_canonical(p: &RuleProvider) -> RuleSet {
    // sing-box consumes source-format sets; binary compilation is an
    // offline concern.
    match &p.path {
        Some(path) => RuleSet::Local {
            tag: p.name.clone(),
            path: path.clone(),
            format: "source",
        },
        None => RuleSet::Remote {
            tag: p.name.clone(),
            url: p.url.clone(),
            format: "source",
            update_interval: Some(format!("{}s", p.interval)),
        },
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

fn port_literal(seed: &BasicRuleIR) -> Result<u16, TranslateError> {
    let raw = literal(seed)?;
    raw.parse::<u16>()
        .map_err(|_| TranslateError::ValidationConflict {
            backend: BACKEND,
            kind: EntityKind::Rule,
            entity: format!("{} -> {}", seed.kind.as_str(), seed.policy),
            reason: format!("`{raw}` is not a port number"),
        })
}

fn rule_with(seed: &BasicRuleIR, fill: impl FnOnce(&mut RouteRule) -> Result<(), TranslateError>) -> Result<SingBoxRule, TranslateError> {
    let mut rule = RouteRule {
        outbound: seed.policy.clone(),
        ..RouteRule::default()
    };
    fill(&mut rule)?;
    Ok(SingBoxRule::Match(rule))
}

fn domain(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.domain.push(literal(seed)?);
        Ok(())
    })
}

fn domain_suffix(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.domain_suffix.push(literal(seed)?);
        Ok(())
    })
}

fn domain_keyword(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.domain_keyword.push(literal(seed)?);
        Ok(())
    })
}

fn ip_cidr(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    // Both address families land in `ip_cidr`; the prefix syntax carries
    // the distinction. sing-box has no `no-resolve` knob: IP rules only
    // ever match already-resolved addresses, which is the flag's `true`
    // behavior, so nothing is lost in translation.
    rule_with(seed, |r| {
        r.ip_cidr.push(literal(seed)?);
        Ok(())
    })
}

fn source_ip(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.source_ip_cidr.push(literal(seed)?);
        Ok(())
    })
}

fn dest_port(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.port.push(port_literal(seed)?);
        Ok(())
    })
}

fn src_port(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.source_port.push(port_literal(seed)?);
        Ok(())
    })
}

fn process_name(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.process_name.push(literal(seed)?);
        Ok(())
    })
}

fn protocol(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.protocol.push(literal(seed)?);
        Ok(())
    })
}

fn rule_set(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    rule_with(seed, |r| {
        r.rule_set.push(literal(seed)?);
        Ok(())
    })
}

fn final_rule(seed: &BasicRuleIR) -> Result<SingBoxRule, TranslateError> {
    Ok(SingBoxRule::Default {
        outbound: seed.policy.clone(),
    })
}

/// Rule dispatch table for sing-box. geoip, ip-asn, domain-set and the
/// HTTP-layer kinds (user-agent, url-regex) have no route-rule
/// counterpart and are intentionally absent.
pub static RULES: Lazy<Registry<BasicRuleIR, SingBoxRule>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::Rule)
        .with("domain", domain)
        .with("domain-suffix", domain_suffix)
        .with("domain-keyword", domain_keyword)
        .with("ip-cidr", ip_cidr)
        .with("ip-cidr6", ip_cidr)
        .with("src-ip", source_ip)
        .with("dest-port", dest_port)
        .with("src-port", src_port)
        .with("process-name", process_name)
        .with("protocol", protocol)
        .with("rule-set", rule_set)
        .with("final", final_rule)
});

/// Translate one canonical rule into its ordered sing-box expansion.
pub fn rules_from_canonical(rule: &Rule) -> Result<Vec<SingBoxRule>, TranslateError> {
    rule.expand(BACKEND)?
        .iter()
        .map(|seed| RULES.construct(seed.kind.as_str(), seed))
        .collect()
}

/// The assembled `route` section.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Route {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RouteRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_set: Vec<RuleSet>,
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_outbound: Option<String>,
}
