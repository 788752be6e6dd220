//! Clash backend adapter.
//!
//! Translates the canonical model into Clash's native configuration
//! shape: proxy maps, group entries with split `proxies`/`use` arrays,
//! provider maps keyed by name, and classical rule lines. The output is a
//! well-typed object graph; YAML rendering is a plain serde_yaml call by
//! the caller.

use std::collections::BTreeMap;

use serde::Serialize;

use px_model::{CanonicalConfig, TranslateError};

pub mod groups;
pub mod providers;
pub mod proxies;
pub mod rules;

pub use groups::{group_from_canonical, split_member_refs, ClashProxyGroup};
pub use providers::{
    provider_from_canonical, rule_provider_from_canonical, ClashProxyProvider, ClashRuleProvider,
};
pub use proxies::{proxy_from_canonical, ClashProxy};
pub use rules::{rules_from_canonical, ClashRule};

/// A complete Clash configuration document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClashConfig {
    pub mode: &'static str,
    pub log_level: &'static str,
    pub ipv6: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed_port: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<ClashProxy>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub proxy_providers: BTreeMap<String, ClashProxyProvider>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxy_groups: Vec<ClashProxyGroup>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rule_providers: BTreeMap<String, ClashRuleProvider>,
    pub rules: Vec<ClashRule>,
}

/// Translate a full canonical configuration.
///
/// Fails on the first entity Clash cannot express; emitting a partial
/// routing configuration is worse than stopping.
pub fn config_from_canonical(cfg: &CanonicalConfig) -> Result<ClashConfig, TranslateError> {
    let proxies = cfg
        .protocols
        .iter()
        .map(proxy_from_canonical)
        .collect::<Result<Vec<_>, _>>()?;

    let proxy_groups = cfg
        .groups
        .iter()
        .map(group_from_canonical)
        .collect::<Result<Vec<_>, _>>()?;

    let proxy_providers: BTreeMap<String, ClashProxyProvider> = cfg
        .providers
        .iter()
        .map(|p| {
            let out = provider_from_canonical(p);
            (out.name.clone(), out)
        })
        .collect();

    let mut rule_providers: BTreeMap<String, ClashRuleProvider> = cfg
        .rule_providers
        .iter()
        .map(|p| {
            let out = rule_provider_from_canonical(p);
            (out.name.clone(), out)
        })
        .collect();
    // Providers referenced only from rule matchers still need an entry.
    for rule in &cfg.rules {
        if let Some(px_model::Matcher::Provider(p)) = &rule.matcher {
            rule_providers
                .entry(p.name.clone())
                .or_insert_with(|| rule_provider_from_canonical(p));
        }
    }

    let mut rule_lines = Vec::new();
    for rule in &cfg.rules {
        rule_lines.extend(rules_from_canonical(rule)?);
    }
    tracing::debug!(
        proxies = proxies.len(),
        groups = proxy_groups.len(),
        rules = rule_lines.len(),
        "translated canonical config for clash"
    );

    Ok(ClashConfig {
        mode: "rule",
        log_level: "info",
        ipv6: true,
        mixed_port: None,
        proxies,
        proxy_providers,
        proxy_groups,
        rule_providers,
        rules: rule_lines,
    })
}
