//! Clash proxy providers and rule providers.

use serde::Serialize;

use px_model::provider::{ProxyProvider, RuleProvider};

/// Health-check block of a proxy provider.
///
/// Built fresh per construction; providers never share one default
/// instance.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClashHealthCheck {
    pub enable: bool,
    pub interval: u64,
    pub lazy: bool,
    pub url: String,
}

impl Default for ClashHealthCheck {
    fn default() -> Self {
        ClashHealthCheck {
            enable: true,
            interval: 120,
            lazy: true,
            url: "https://www.gstatic.com/generate_204".to_string(),
        }
    }
}

/// One entry of the `proxy-providers` map; the canonical name is the map
/// key, not a field of the serialized body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClashProxyProvider {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<ClashHealthCheck>,
}

/// Translate one canonical proxy provider.
///
/// Providers are plain data for every backend; there is no per-variant
/// dispatch and no way for this construction to fail.
#[must_use]
pub fn provider_from_canonical(p: &ProxyProvider) -> ClashProxyProvider {
    let path = p
        .path
        .clone()
        .unwrap_or_else(|| format!("./proxy-providers/{}.yaml", p.name));
    ClashProxyProvider {
        name: p.name.clone(),
        kind: "http",
        url: p.url.clone(),
        path,
        interval: Some(p.interval),
        filter: p.filter.clone(),
        health_check: p.health_check.then(ClashHealthCheck::default),
    }
}

/// One entry of the `rule-providers` map.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClashRuleProvider {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub behavior: &'static str,
    pub format: &'static str,
    pub url: String,
    pub path: String,
    pub interval: u64,
}

#[must_use]
pub fn rule_provider_from_canonical(p: &RuleProvider) -> ClashRuleProvider {
    let path = p
        .path
        .clone()
        .unwrap_or_else(|| format!("./rule-providers/{}.yaml", p.name));
    ClashRuleProvider {
        name: p.name.clone(),
        kind: "http",
        behavior: p.behavior.as_str(),
        format: p.format.as_str(),
        url: p.url.clone(),
        path,
        interval: p.interval,
    }
}
