//! External proxy and rule sources, refreshed by the client engines.

use serde::{Deserialize, Serialize};

/// An external source supplying a list of proxies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyProvider {
    pub name: String,
    pub url: String,
    /// Local cache path; backends derive one from the name when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Refresh interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Regex over proxy names; only matches are used.
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default = "default_true")]
    pub health_check: bool,
}

/// Payload interpretation of a rule provider.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleBehavior {
    #[default]
    Domain,
    Ipcidr,
    Classical,
}

impl RuleBehavior {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleBehavior::Domain => "domain",
            RuleBehavior::Ipcidr => "ipcidr",
            RuleBehavior::Classical => "classical",
        }
    }
}

/// On-the-wire format of a rule provider payload.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleFormat {
    #[default]
    Text,
    Yaml,
}

impl RuleFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleFormat::Text => "text",
            RuleFormat::Yaml => "yaml",
        }
    }
}

/// An external source supplying rule matchers (domain lists, CIDR lists).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleProvider {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub path: Option<String>,
    /// Refresh interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default)]
    pub behavior: RuleBehavior,
    #[serde(default)]
    pub format: RuleFormat,
}

fn default_interval() -> u64 {
    21_600
}

fn default_true() -> bool {
    true
}
