//! Surge backend adapter.
//!
//! Translates the canonical model into Surge's line-based configuration:
//! `[Proxy]`, `[Proxy Group]` and `[Rule]` sections of fully-formatted
//! `name = value` strings. Rendering is plain line joining; there is no
//! external serializer to hand off to.

use px_model::{CanonicalConfig, TranslateError};

pub mod groups;
pub mod providers;
pub mod proxies;
pub mod rules;

pub use groups::{group_from_canonical, SurgeProxyGroup};
pub use providers::{provider_from_canonical, SurgeExternalGroup};
pub use proxies::{proxy_from_canonical, SurgeProxy};
pub use rules::{rules_from_canonical, SurgeRule};

/// A complete Surge configuration, section by section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurgeConfig {
    pub proxies: Vec<SurgeProxy>,
    pub groups: Vec<SurgeProxyGroup>,
    /// Providers rendered as externally-populated policy groups; they
    /// share the `[Proxy Group]` section with `groups`.
    pub external_groups: Vec<SurgeExternalGroup>,
    pub rules: Vec<SurgeRule>,
}

impl SurgeConfig {
    /// Render the sections as an INI-like document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[Proxy]\n");
        for proxy in &self.proxies {
            out.push_str(&proxy.to_string());
            out.push('\n');
        }
        out.push_str("\n[Proxy Group]\n");
        for group in &self.groups {
            out.push_str(&group.to_string());
            out.push('\n');
        }
        for group in &self.external_groups {
            out.push_str(&group.to_string());
            out.push('\n');
        }
        out.push_str("\n[Rule]\n");
        for rule in &self.rules {
            out.push_str(&rule.to_string());
            out.push('\n');
        }
        out
    }
}

/// Translate a full canonical configuration.
pub fn config_from_canonical(cfg: &CanonicalConfig) -> Result<SurgeConfig, TranslateError> {
    let proxies = cfg
        .protocols
        .iter()
        .map(proxy_from_canonical)
        .collect::<Result<Vec<_>, _>>()?;

    let groups = cfg
        .groups
        .iter()
        .map(group_from_canonical)
        .collect::<Result<Vec<_>, _>>()?;

    let external_groups = cfg.providers.iter().map(provider_from_canonical).collect();

    let mut rule_lines = Vec::new();
    for rule in &cfg.rules {
        rule_lines.extend(rules_from_canonical(rule)?);
    }
    tracing::debug!(
        proxies = proxies.len(),
        groups = groups.len(),
        rules = rule_lines.len(),
        "translated canonical config for surge"
    );

    Ok(SurgeConfig {
        proxies,
        groups,
        external_groups,
        rules: rule_lines,
    })
}
