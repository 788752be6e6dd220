//! Surge external policy groups.
//!
//! Surge has no provider section; a canonical proxy provider becomes a
//! policy group that imports its members from `policy-path`:
//!
//! ```text
//! remote-pool = select, policy-path=https://sub.example.com/surge, update-interval=21600
//! ```

use std::fmt;

use px_model::provider::ProxyProvider;

/// One externally-populated `[Proxy Group]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurgeExternalGroup {
    pub name: String,
    /// Policy kind applied over the imported members.
    pub kind: &'static str,
    pub policy_path: String,
    pub update_interval: u64,
    pub policy_regex_filter: Option<String>,
}

impl fmt::Display for SurgeExternalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}, policy-path={}, update-interval={}",
            self.name, self.kind, self.policy_path, self.update_interval
        )?;
        if let Some(filter) = &self.policy_regex_filter {
            write!(f, ", policy-regex-filter={filter}")?;
        }
        Ok(())
    }
}

/// Translate one canonical proxy provider into an external policy group.
#[must_use]
pub fn provider_from_canonical(p: &ProxyProvider) -> SurgeExternalGroup {
    SurgeExternalGroup {
        name: p.name.clone(),
        kind: "select",
        policy_path: p.url.clone(),
        update_interval: p.interval,
        policy_regex_filter: p.filter.clone(),
    }
}
