//! Typed errors for the translation engine.
//!
//! All failures surface synchronously as `Result`; translation never
//! degrades an entity to a default. Every error names the offending
//! entity and the backend it was being translated for, so the invoking
//! tool can report it and halt emission.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target configuration engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Clash,
    Surge,
    #[serde(rename = "sing-box")]
    SingBox,
}

impl Backend {
    /// Lowercase name used in diagnostics and CLI arguments.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Clash => "clash",
            Backend::Surge => "surge",
            Backend::SingBox => "sing-box",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kind a dispatch registry is responsible for.
///
/// Protocols, rules and groups are dispatched independently because
/// backend coverage differs per kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Protocol,
    ProxyGroup,
    ProxyProvider,
    Rule,
    RuleProvider,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Protocol => "protocol",
            EntityKind::ProxyGroup => "proxy-group",
            EntityKind::ProxyProvider => "proxy-provider",
            EntityKind::Rule => "rule",
            EntityKind::RuleProvider => "rule-provider",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for canonical-to-backend translation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The discriminant has no registered constructor for this backend.
    ///
    /// Fatal for the entity: retrying cannot succeed without changing the
    /// backend's supported set. Silent rule/policy loss in a routing
    /// configuration is worse than a hard stop, so this is never coerced
    /// to a near-equivalent variant.
    #[error("{backend} does not support {kind} variant `{tag}` (supported: {})", known.join(", "))]
    UnsupportedVariant {
        backend: Backend,
        kind: EntityKind,
        tag: String,
        /// Sorted list of tags the registry does know, for diagnostics.
        known: Vec<&'static str>,
    },

    /// Mutually exclusive fields were both set, or a required alternative
    /// is missing. Aborts this entity's translation only.
    #[error("invalid {kind} `{entity}` for {backend}: {reason}")]
    ValidationConflict {
        backend: Backend,
        kind: EntityKind,
        entity: String,
        reason: String,
    },

    /// A policy or matcher name does not resolve to any known entity.
    ///
    /// Produced by the eager validation pass on a full configuration, not
    /// by per-entity translation.
    #[error("reference `{name}` (from {referrer}) does not resolve to any known entity")]
    MalformedReference { name: String, referrer: String },
}

/// Convenience constructor used by backend adapters.
pub fn conflict(
    backend: Backend,
    kind: EntityKind,
    entity: impl Into<String>,
    reason: impl Into<String>,
) -> TranslateError {
    TranslateError::ValidationConflict {
        backend,
        kind,
        entity: entity.into(),
        reason: reason.into(),
    }
}
