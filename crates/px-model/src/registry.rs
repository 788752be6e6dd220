//! Discriminant-based dispatch.
//!
//! One [`Registry`] instance exists per (backend, entity-kind) pair,
//! populated once at module initialization and immutable afterwards.
//! Lookup failure is a typed [`TranslateError::UnsupportedVariant`]
//! carrying the full supported set, so "what does this backend support"
//! is introspectable instead of buried in chained conditionals.

use std::collections::BTreeMap;

use crate::errors::{Backend, EntityKind, TranslateError};

/// Validating constructor: canonical entity in, backend entity out.
pub type Constructor<In, Out> = fn(&In) -> Result<Out, TranslateError>;

/// Tag → constructor map for one (backend, entity-kind) pair.
pub struct Registry<In, Out> {
    backend: Backend,
    kind: EntityKind,
    entries: BTreeMap<&'static str, Constructor<In, Out>>,
}

impl<In, Out> Registry<In, Out> {
    #[must_use]
    pub fn new(backend: Backend, kind: EntityKind) -> Self {
        Registry {
            backend,
            kind,
            entries: BTreeMap::new(),
        }
    }

    /// Register a constructor for `tag`. Later registrations replace
    /// earlier ones; population happens once, at module init.
    pub fn register(&mut self, tag: &'static str, ctor: Constructor<In, Out>) {
        self.entries.insert(tag, ctor);
    }

    /// Builder-style [`Registry::register`].
    #[must_use]
    pub fn with(mut self, tag: &'static str, ctor: Constructor<In, Out>) -> Self {
        self.register(tag, ctor);
        self
    }

    /// Look up the constructor for `tag`.
    pub fn lookup(&self, tag: &str) -> Result<Constructor<In, Out>, TranslateError> {
        self.entries.get(tag).copied().ok_or_else(|| {
            tracing::debug!(
                backend = %self.backend,
                kind = %self.kind,
                tag,
                "no constructor registered"
            );
            TranslateError::UnsupportedVariant {
                backend: self.backend,
                kind: self.kind,
                tag: tag.to_string(),
                known: self.known_tags(),
            }
        })
    }

    /// Dispatch `input` through the constructor registered for `tag`.
    pub fn construct(&self, tag: &str, input: &In) -> Result<Out, TranslateError> {
        (self.lookup(tag)?)(input)
    }

    /// Sorted list of supported tags.
    #[must_use]
    pub fn known_tags(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(x: &u32) -> Result<u64, TranslateError> {
        Ok(u64::from(*x) * 2)
    }

    #[test]
    fn lookup_dispatches_registered_tag() {
        let reg = Registry::new(Backend::Clash, EntityKind::Protocol).with("double", double);
        assert_eq!(reg.construct("double", &21).unwrap(), 42);
    }

    #[test]
    fn unknown_tag_reports_supported_set() {
        let reg: Registry<u32, u64> = Registry::new(Backend::Surge, EntityKind::Rule)
            .with("b", double)
            .with("a", double);
        let err = reg.lookup("nope").unwrap_err();
        match err {
            TranslateError::UnsupportedVariant {
                backend,
                kind,
                tag,
                known,
            } => {
                assert_eq!(backend, Backend::Surge);
                assert_eq!(kind, EntityKind::Rule);
                assert_eq!(tag, "nope");
                // BTreeMap keeps diagnostics deterministic.
                assert_eq!(known, vec!["a", "b"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
