//! Clash proxy groups.
//!
//! A canonical group interleaves protocols, nested groups, providers and
//! bare names in one ordered member list; Clash wants two arrays
//! (`proxies` and `use`). The split is index-tagged and merged back by
//! original position so same-kind members keep their relative order —
//! reordering would change select/fallback evaluation order.

use once_cell::sync::Lazy;
use serde::Serialize;

use px_model::errors::{Backend, EntityKind};
use px_model::group::{GroupOptions, Member, ProxyGroup};
use px_model::split::{classify_members, map_indexed, merge_by_index};
use px_model::{Registry, TranslateError};

use crate::proxies::proxy_from_canonical;

const BACKEND: Backend = Backend::Clash;

/// One entry of the `proxy-groups` array.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClashProxyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Inline member names, original relative order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    /// Provider names, original relative order.
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub use_providers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_udp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<&'static str>,
}

/// Split one member list into (inline member names, provider names).
///
/// Protocol members are pushed through the Clash protocol registry first:
/// a member this backend cannot express fails the whole group with
/// `UnsupportedVariant` instead of being dropped from the list.
pub fn split_member_refs(members: &[Member]) -> Result<(Vec<String>, Vec<String>), TranslateError> {
    let buckets = classify_members(members);

    let protocols = map_indexed(&buckets.protocols, |p| {
        proxy_from_canonical(p).map(|cp| cp.name().to_string())
    })?;
    let groups = map_indexed(&buckets.groups, |g| Ok(g.name.clone()))?;
    let names = map_indexed(&buckets.names, |n| Ok(n.to_string()))?;
    let providers = map_indexed(&buckets.providers, |p| Ok(p.name.clone()))?;

    let inline = merge_by_index(vec![protocols, groups, names]);
    let use_providers = merge_by_index(vec![providers]);
    Ok((inline, use_providers))
}

fn base(group: &ProxyGroup, kind: &'static str) -> Result<ClashProxyGroup, TranslateError> {
    let (proxies, use_providers) = split_member_refs(&group.members)?;
    Ok(ClashProxyGroup {
        name: group.name.clone(),
        kind,
        proxies,
        use_providers,
        url: None,
        interval: None,
        tolerance: None,
        lazy: None,
        disable_udp: group.disable_udp(),
        strategy: None,
    })
}

fn select(group: &ProxyGroup) -> Result<ClashProxyGroup, TranslateError> {
    base(group, "select")
}

fn url_test(group: &ProxyGroup) -> Result<ClashProxyGroup, TranslateError> {
    let GroupOptions::UrlTest(opts) = &group.options else {
        unreachable!("registered under the url-test tag");
    };
    let mut out = base(group, "url-test")?;
    out.url = Some(group.url.clone());
    out.interval = Some(opts.interval);
    out.tolerance = Some(opts.tolerance);
    out.lazy = Some(group.lazy);
    Ok(out)
}

fn fallback(group: &ProxyGroup) -> Result<ClashProxyGroup, TranslateError> {
    let GroupOptions::Fallback(opts) = &group.options else {
        unreachable!("registered under the fallback tag");
    };
    let mut out = base(group, "fallback")?;
    out.url = Some(group.url.clone());
    out.interval = Some(opts.interval);
    Ok(out)
}

fn load_balance(group: &ProxyGroup) -> Result<ClashProxyGroup, TranslateError> {
    let GroupOptions::LoadBalance(opts) = &group.options else {
        unreachable!("registered under the load-balance tag");
    };
    let mut out = base(group, "load-balance")?;
    out.url = Some(group.url.clone());
    out.strategy = opts.strategy.map(|s| s.as_str());
    Ok(out)
}

/// Group dispatch table for Clash; all four canonical group kinds map.
pub static GROUPS: Lazy<Registry<ProxyGroup, ClashProxyGroup>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::ProxyGroup)
        .with("select", select)
        .with("url-test", url_test)
        .with("fallback", fallback)
        .with("load-balance", load_balance)
});

/// Translate one canonical proxy group into a Clash group entry.
pub fn group_from_canonical(group: &ProxyGroup) -> Result<ClashProxyGroup, TranslateError> {
    GROUPS.construct(group.tag(), group)
}
