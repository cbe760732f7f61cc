//! Ordered data-source precedence
//!
//! Some report figures (the period baseline, the active/inactive split) can
//! come from several places: the upstream service, the command line, the
//! records themselves, or a local computation. Instead of chaining fallbacks
//! inline, callers list the candidates in priority order and the first one
//! that is present wins. The winning source travels with the value so the
//! report can say where a figure came from.
//!
//! # Examples
//!
//! ```
//! use meterstat_core::sources::{DataSource, Precedence};
//!
//! let baseline = Precedence::new()
//!     .then(DataSource::Server, None)
//!     .then(DataSource::Configured, Some(144.0));
//!
//! let resolved = baseline.resolve_or(DataSource::Computed, 0.0);
//! assert_eq!(resolved.value, 144.0);
//! assert_eq!(resolved.source, DataSource::Configured);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a report figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Pre-aggregated by the upstream service
    Server,
    /// Supplied by the operator (CLI flag or config)
    Configured,
    /// Summed from per-record fields
    Records,
    /// Computed locally by the engine
    Computed,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Configured => write!(f, "configured"),
            Self::Records => write!(f, "records"),
            Self::Computed => write!(f, "computed"),
        }
    }
}

/// A value tagged with the source it was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: DataSource) -> Self {
        Self { value, source }
    }
}

/// Priority-ordered list of candidate sources for one figure
#[derive(Debug, Clone, PartialEq)]
pub struct Precedence<T> {
    candidates: Vec<(DataSource, Option<T>)>,
}

impl<T> Default for Precedence<T> {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }
}

impl<T: Clone> Precedence<T> {
    /// Create an empty precedence list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate with lower priority than every existing one
    pub fn then(mut self, source: DataSource, value: Option<T>) -> Self {
        self.candidates.push((source, value));
        self
    }

    /// Candidate sources in priority order
    pub fn sources(&self) -> impl Iterator<Item = DataSource> + '_ {
        self.candidates.iter().map(|(source, _)| *source)
    }

    /// First present candidate, if any
    pub fn resolve(&self) -> Option<Sourced<T>> {
        self.candidates.iter().find_map(|(source, value)| {
            value
                .as_ref()
                .map(|value| Sourced::new(value.clone(), *source))
        })
    }

    /// First present candidate, or `fallback` tagged with `source`
    pub fn resolve_or(&self, source: DataSource, fallback: T) -> Sourced<T> {
        self.resolve()
            .unwrap_or_else(|| Sourced::new(fallback, source))
    }

    /// First present candidate, or a lazily computed fallback
    pub fn resolve_or_else(&self, source: DataSource, fallback: impl FnOnce() -> T) -> Sourced<T> {
        self.resolve()
            .unwrap_or_else(|| Sourced::new(fallback(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_candidate_wins() {
        let precedence = Precedence::new()
            .then(DataSource::Server, Some(1.0))
            .then(DataSource::Configured, Some(2.0));
        let resolved = precedence.resolve().unwrap();
        assert_eq!(resolved.value, 1.0);
        assert_eq!(resolved.source, DataSource::Server);
    }

    #[test]
    fn test_absent_candidates_are_skipped() {
        let precedence = Precedence::new()
            .then(DataSource::Server, None)
            .then(DataSource::Records, Some(7.5));
        assert_eq!(
            precedence.resolve(),
            Some(Sourced::new(7.5, DataSource::Records))
        );
    }

    #[test]
    fn test_empty_precedence_falls_back() {
        let precedence: Precedence<f64> = Precedence::new();
        assert!(precedence.resolve().is_none());
        let resolved = precedence.resolve_or_else(DataSource::Computed, || 3.0);
        assert_eq!(resolved, Sourced::new(3.0, DataSource::Computed));
    }

    #[test]
    fn test_fallback_not_evaluated_when_resolved() {
        let precedence = Precedence::new().then(DataSource::Server, Some(1.0));
        let resolved =
            precedence.resolve_or_else(DataSource::Computed, || panic!("fallback evaluated"));
        assert_eq!(resolved.source, DataSource::Server);
    }

    #[test]
    fn test_sources_order() {
        let precedence: Precedence<f64> = Precedence::new()
            .then(DataSource::Server, None)
            .then(DataSource::Configured, None);
        let order: Vec<_> = precedence.sources().collect();
        assert_eq!(order, vec![DataSource::Server, DataSource::Configured]);
    }
}
