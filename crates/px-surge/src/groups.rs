//! Surge policy groups.
//!
//! A group is one line: `name = kind, member1, member2, key=value, ...`.
//! Members are referenced by name in the original order, whatever their
//! kind — a provider member refers to the external policy group emitted
//! for it (see `providers`).

use std::fmt;

use once_cell::sync::Lazy;

use px_model::errors::{Backend, EntityKind};
use px_model::group::{BalanceStrategy, GroupOptions, ProxyGroup};
use px_model::{Registry, TranslateError};

use crate::proxies::proxy_from_canonical;

const BACKEND: Backend = Backend::Surge;

/// One `[Proxy Group]` section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurgeProxyGroup {
    pub name: String,
    pub kind: &'static str,
    /// Member names, original order.
    pub members: Vec<String>,
    /// `key=value` options in declared order.
    pub opts: Vec<(&'static str, String)>,
}

impl fmt::Display for SurgeProxyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.kind)?;
        for member in &self.members {
            write!(f, ", {member}")?;
        }
        for (key, value) in &self.opts {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

/// Member names in original order.
///
/// Inline protocol members are pushed through the Surge protocol registry
/// first so that a member Surge cannot express fails the group instead of
/// appearing as a dangling name.
fn member_names(group: &ProxyGroup) -> Result<Vec<String>, TranslateError> {
    group
        .members
        .iter()
        .map(|member| match member {
            px_model::Member::Protocol(p) => {
                proxy_from_canonical(p).map(|line| line.name)
            }
            other => Ok(other.name().to_string()),
        })
        .collect()
}

fn select(group: &ProxyGroup) -> Result<SurgeProxyGroup, TranslateError> {
    Ok(SurgeProxyGroup {
        name: group.name.clone(),
        kind: "select",
        members: member_names(group)?,
        opts: Vec::new(),
    })
}

fn url_test(group: &ProxyGroup) -> Result<SurgeProxyGroup, TranslateError> {
    let GroupOptions::UrlTest(o) = &group.options else {
        unreachable!("registered under the url-test tag");
    };
    Ok(SurgeProxyGroup {
        name: group.name.clone(),
        kind: "url-test",
        members: member_names(group)?,
        opts: vec![
            ("url", group.url.clone()),
            ("interval", o.interval.to_string()),
            ("tolerance", o.tolerance.to_string()),
            ("timeout", o.timeout.to_string()),
        ],
    })
}

fn fallback(group: &ProxyGroup) -> Result<SurgeProxyGroup, TranslateError> {
    let GroupOptions::Fallback(o) = &group.options else {
        unreachable!("registered under the fallback tag");
    };
    Ok(SurgeProxyGroup {
        name: group.name.clone(),
        kind: "fallback",
        members: member_names(group)?,
        opts: vec![
            ("url", group.url.clone()),
            ("interval", o.interval.to_string()),
            ("timeout", o.timeout.to_string()),
        ],
    })
}

fn load_balance(group: &ProxyGroup) -> Result<SurgeProxyGroup, TranslateError> {
    let GroupOptions::LoadBalance(o) = &group.options else {
        unreachable!("registered under the load-balance tag");
    };
    // Surge has no strategy knob; consistent hashing maps to persistent
    // sessions.
    let persistent = matches!(o.strategy, Some(BalanceStrategy::ConsistentHashing));
    Ok(SurgeProxyGroup {
        name: group.name.clone(),
        kind: "load-balance",
        members: member_names(group)?,
        opts: vec![("persistent", persistent.to_string())],
    })
}

/// Group dispatch table for Surge; all four canonical group kinds map.
pub static GROUPS: Lazy<Registry<ProxyGroup, SurgeProxyGroup>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::ProxyGroup)
        .with("select", select)
        .with("url-test", url_test)
        .with("fallback", fallback)
        .with("load-balance", load_balance)
});

/// Translate one canonical proxy group into a Surge group line.
pub fn group_from_canonical(group: &ProxyGroup) -> Result<SurgeProxyGroup, TranslateError> {
    GROUPS.construct(group.tag(), group)
}
