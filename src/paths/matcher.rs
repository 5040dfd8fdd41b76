use super::similarity::similarity;
use super::{is_parameter, segments};
use std::collections::BTreeSet;

/// Result of matching one normalized target against the declared routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Exact,
    /// Matched a parameterized pattern segment by segment.
    Positional(String),
    /// Matches only when case is ignored. Carries the corrected target.
    CaseMismatch(String),
    NoMatch { suggestion: Option<String> },
}

impl MatchOutcome {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Exact | Self::Positional(_))
    }

    /// High-confidence replacement for a target that did not match.
    #[must_use]
    pub fn correction(&self) -> Option<&str> {
        match self {
            Self::CaseMismatch(fixed) => Some(fixed),
            Self::NoMatch { suggestion } => suggestion.as_deref(),
            _ => None,
        }
    }
}

/// The set of normalized route patterns of one run.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    patterns: BTreeSet<String>,
    threshold: f64,
}

impl RouteSet {
    pub fn new<I>(patterns: I, threshold: f64) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            threshold,
        }
    }

    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Matches an already normalized target.
    #[must_use]
    pub fn matches(&self, target: &str) -> MatchOutcome {
        if self.patterns.contains(target) {
            return MatchOutcome::Exact;
        }
        let parts = segments(target);
        if let Some(p) = self.find_positional(&parts, |a, b| a == b) {
            return MatchOutcome::Positional(p.to_string());
        }
        if let Some(fixed) = self.case_correction(target, &parts) {
            return MatchOutcome::CaseMismatch(fixed);
        }
        MatchOutcome::NoMatch {
            suggestion: self.suggest(target),
        }
    }

    fn find_positional(&self, parts: &[&str], eq: fn(&str, &str) -> bool) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|p| positional(&segments(p), parts, eq))
    }

    fn case_correction(&self, target: &str, parts: &[&str]) -> Option<String> {
        if let Some(p) = self.patterns.iter().find(|p| p.eq_ignore_ascii_case(target)) {
            return Some(p.clone());
        }
        let pattern = self.find_positional(parts, str::eq_ignore_ascii_case)?;
        let fixed: Vec<&str> = segments(pattern)
            .into_iter()
            .zip(parts)
            .map(|(seg, part)| if is_parameter(seg) { *part } else { seg })
            .collect();
        Some(format!("/{}", fixed.join("/")))
    }

    /// Unique closest parameter-free pattern at or above the threshold.
    fn suggest(&self, target: &str) -> Option<String> {
        let mut best: Option<(f64, &str)> = None;
        let mut tied = false;
        for pattern in self.patterns.iter().filter(|p| !super::has_parameters(p)) {
            let score = similarity(target, pattern);
            if score < self.threshold {
                continue;
            }
            match best {
                Some((top, _)) if (score - top).abs() < f64::EPSILON => tied = true,
                Some((top, _)) if score < top => {}
                _ => {
                    best = Some((score, pattern.as_str()));
                    tied = false;
                }
            }
        }
        if tied {
            return None;
        }
        best.map(|(_, p)| p.to_string())
    }
}

fn positional(pattern: &[&str], target: &[&str], eq: fn(&str, &str) -> bool) -> bool {
    pattern.len() == target.len()
        && pattern
            .iter()
            .zip(target)
            .all(|(p, t)| is_parameter(p) || eq(p, t))
}
