//! Deterministic repair proposals. Anything uncertain is `Unfixable`.

use crate::paths::{has_parameters, split_suffix};
use crate::xref::{BrokenLink, NonCanonicalLink};

/// Marker written over links nobody can repair.
pub const DISABLED_TARGET: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    /// Replacement for the full literal, query and fragment included.
    Replace(String),
    Unfixable,
}

/// Replacement for a broken link, keeping its `?query` or `#fragment`.
#[must_use]
pub fn propose_link(broken: &BrokenLink) -> Proposal {
    match &broken.suggestion {
        Some(path) => Proposal::Replace(with_suffix(path, &broken.link.target)),
        None => Proposal::Unfixable,
    }
}

/// Canonical spelling of a link that only resolved after normalization.
#[must_use]
pub fn propose_canonical(link: &NonCanonicalLink) -> Proposal {
    Proposal::Replace(with_suffix(&link.canonical, &link.link.target))
}

/// A missing page can be stubbed only for a concrete path other than the root.
#[must_use]
pub fn stub_eligible(broken: &BrokenLink) -> bool {
    broken.suggestion.is_none() && broken.normalized != "/" && !has_parameters(&broken.normalized)
}

fn with_suffix(path: &str, original: &str) -> String {
    let (_, suffix) = split_suffix(original.trim());
    format!("{path}{suffix}")
}
