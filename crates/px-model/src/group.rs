//! Canonical proxy groups.

use serde::{Deserialize, Serialize};

use crate::protocol::Protocol;
use crate::provider::ProxyProvider;

/// One member of a group's ordered reference list.
///
/// The canonical model interleaves protocols, nested groups, providers and
/// bare name strings in a single ordered array; backends that keep inline
/// proxies and providers in separate arrays recover the relative order via
/// the splitter (`crate::split`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Member {
    Protocol(Protocol),
    Group(Box<ProxyGroup>),
    Provider(ProxyProvider),
    Name(String),
}

impl Member {
    /// Display name of the referenced entity.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Member::Protocol(p) => &p.name,
            Member::Group(g) => &g.name,
            Member::Provider(p) => &p.name,
            Member::Name(n) => n,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlTestOptions {
    /// Probe interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Latency delta in milliseconds before switching away from the
    /// current pick.
    #[serde(default = "default_tolerance")]
    pub tolerance: u64,
    /// Probe timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for UrlTestOptions {
    fn default() -> Self {
        UrlTestOptions {
            interval: default_interval(),
            tolerance: default_tolerance(),
            timeout: default_timeout(),
        }
    }
}

fn default_interval() -> u64 {
    60
}
fn default_tolerance() -> u64 {
    300
}
fn default_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackOptions {
    #[serde(default = "default_fallback_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        FallbackOptions {
            interval: default_fallback_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_fallback_interval() -> u64 {
    120
}

/// Balancing strategies understood by Clash; Surge renders
/// `persistent=true` for consistent hashing.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceStrategy {
    #[default]
    ConsistentHashing,
    RoundRobin,
}

impl BalanceStrategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStrategy::ConsistentHashing => "consistent-hashing",
            BalanceStrategy::RoundRobin => "round-robin",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadBalanceOptions {
    #[serde(default)]
    pub strategy: Option<BalanceStrategy>,
}

/// Group behavior; the enum discriminant is the type tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GroupOptions {
    Select,
    UrlTest(UrlTestOptions),
    Fallback(FallbackOptions),
    LoadBalance(LoadBalanceOptions),
}

impl GroupOptions {
    /// Canonical tag string; the dispatch key for group registries.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            GroupOptions::Select => "select",
            GroupOptions::UrlTest(_) => "url-test",
            GroupOptions::Fallback(_) => "fallback",
            GroupOptions::LoadBalance(_) => "load-balance",
        }
    }
}

/// One canonical proxy group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyGroup {
    pub name: String,
    /// Ordered member list; must be non-empty.
    pub members: Vec<Member>,
    #[serde(flatten)]
    pub options: GroupOptions,
    /// Evaluation URL for health probes.
    #[serde(default = "default_probe_url")]
    pub url: String,
    #[serde(default = "default_true")]
    pub udp: bool,
    /// Defer the first probe until the group is used (Clash).
    #[serde(default = "default_true")]
    pub lazy: bool,
}

fn default_probe_url() -> String {
    "https://www.gstatic.com/generate_204".to_string()
}

fn default_true() -> bool {
    true
}

impl ProxyGroup {
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.options.tag()
    }

    /// Clash expresses UDP as the negation.
    #[must_use]
    pub fn disable_udp(&self) -> bool {
        !self.udp
    }
}
