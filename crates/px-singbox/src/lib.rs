//! sing-box backend adapter.
//!
//! Translates the canonical model into sing-box's native JSON document
//! shape: an `outbounds` array (proxies and selector/urltest groups share
//! it, identified by `tag`) and a `route` section with rules, rule sets
//! and the default outbound. JSON rendering is a plain serde_json call by
//! the caller.

use serde::Serialize;

use px_model::{CanonicalConfig, TranslateError};

pub mod outbounds;
pub mod route;
pub mod shared;

pub use outbounds::{group_from_canonical, outbound_from_canonical, SingBoxOutbound};
pub use route::{rule_set_from_canonical, rules_from_canonical, Route, RouteRule, RuleSet, SingBoxRule};

/// Log section; sing-box complains about configs without one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Log {
    pub level: &'static str,
    pub timestamp: bool,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: "info",
            timestamp: true,
        }
    }
}

/// A complete sing-box configuration document.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SingBoxConfig {
    pub log: Log,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outbounds: Vec<SingBoxOutbound>,
    pub route: Route,
}

/// Translate a full canonical configuration.
///
/// Proxies come first in `outbounds`, then groups, so every tag a group
/// references is already defined. A `final` canonical rule becomes
/// `route.final`; the last one wins if several are present.
pub fn config_from_canonical(cfg: &CanonicalConfig) -> Result<SingBoxConfig, TranslateError> {
    let mut outbounds = Vec::new();
    for protocol in &cfg.protocols {
        outbounds.push(outbound_from_canonical(protocol)?);
    }
    for group in &cfg.groups {
        outbounds.push(group_from_canonical(group)?);
    }

    // sing-box has no proxy-provider notion. A provider used as a group
    // member is a hard error (see `outbounds::group_from_canonical`); a
    // top-level provider nothing references is only reported.
    for provider in &cfg.providers {
        tracing::warn!(provider = %provider.name, "proxy providers have no sing-box counterpart; skipped");
    }

    let mut route = Route::default();
    for provider in &cfg.rule_providers {
        route.rule_set.push(rule_set_from_canonical(provider));
    }
    for rule in &cfg.rules {
        for translated in rules_from_canonical(rule)? {
            match translated {
                SingBoxRule::Match(r) => route.rules.push(r),
                SingBoxRule::Default { outbound } => route.final_outbound = Some(outbound),
            }
        }
        // Providers referenced only from rule matchers still need a
        // rule_set entry.
        if let Some(px_model::Matcher::Provider(p)) = &rule.matcher {
            if !route.rule_set.iter().any(|rs| match rs {
                route::RuleSet::Remote { tag, .. } | route::RuleSet::Local { tag, .. } => {
                    tag == &p.name
                }
            }) {
                route.rule_set.push(rule_set_from_canonical(p));
            }
        }
    }
    tracing::debug!(
        outbounds = outbounds.len(),
        rules = route.rules.len(),
        "translated canonical config for sing-box"
    );

    Ok(SingBoxConfig {
        log: Log::default(),
        outbounds,
        route,
    })
}
