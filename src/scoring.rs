//! Category scores and the weighted overall score.

use crate::config::{Penalties, Weights};
use crate::types::{FactSet, HitKind, Issue, Severity};
use crate::xref::CrossReference;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub overall: u32,
    pub navigation: u32,
    pub security: u32,
    pub rpc: u32,
    pub quality: u32,
}

/// Counts the scoring function depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreInputs {
    pub broken_links: usize,
    pub orphan_pages: usize,
    pub no_routes: bool,
    pub routing_file_without_routes: bool,
    pub security_critical: usize,
    pub security_warning: usize,
    pub ghost_calls: usize,
    pub dead_procedures: usize,
    pub todo_markers: usize,
    pub console_excess_files: usize,
}

impl ScoreInputs {
    #[must_use]
    pub fn collect(xref: &CrossReference, facts: &FactSet, issues: &[Issue]) -> Self {
        let security = |sev: Severity| {
            issues
                .iter()
                .filter(|i| i.category.is_security() && i.severity == sev)
                .count()
        };
        let hits = |kind: HitKind| facts.hits.iter().filter(|h| h.kind == kind).count();
        Self {
            broken_links: xref.broken_links.len(),
            orphan_pages: xref.orphan_pages.len(),
            no_routes: facts.routes.is_empty(),
            routing_file_without_routes: xref.routing_file_without_routes,
            security_critical: security(Severity::Critical),
            security_warning: security(Severity::Warning),
            ghost_calls: xref.ghost_calls.len(),
            dead_procedures: xref.dead_procedures.len(),
            todo_markers: hits(HitKind::TodoMarker),
            console_excess_files: hits(HitKind::ExcessDebugLog),
        }
    }
}

/// Applies penalties and weights. Every category score is clamped to `[0, 100]`.
#[must_use]
pub fn compute(inputs: &ScoreInputs, weights: &Weights, penalties: &Penalties) -> Scores {
    let p = |n: usize, each: u32| saturating(n).saturating_mul(i64::from(each));

    let navigation = if inputs.routing_file_without_routes {
        0
    } else {
        deduct(&[
            p(inputs.broken_links, penalties.broken_link),
            p(inputs.orphan_pages, penalties.orphan_page),
            if inputs.no_routes { i64::from(penalties.no_routes) } else { 0 },
        ])
    };
    let security = deduct(&[
        p(inputs.security_critical, penalties.security_critical),
        p(inputs.security_warning, penalties.security_warning),
    ]);
    let rpc = deduct(&[
        p(inputs.ghost_calls, penalties.ghost_call).min(i64::from(penalties.ghost_call_cap)),
        p(inputs.dead_procedures, penalties.dead_procedure)
            .min(i64::from(penalties.dead_procedure_cap)),
    ]);
    let quality = deduct(&[
        p(inputs.todo_markers, penalties.todo_marker),
        p(inputs.console_excess_files, penalties.console_excess),
    ]);

    let weighted = weights.navigation * f64::from(navigation)
        + weights.security * f64::from(security)
        + weights.rpc * f64::from(rpc)
        + weights.quality * f64::from(quality);

    Scores {
        overall: clamp_f64(weighted.round()),
        navigation,
        security,
        rpc,
        quality,
    }
}

fn saturating(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// 100 minus every deduction, clamped to `[0, 100]`.
fn deduct(deductions: &[i64]) -> u32 {
    let score = deductions.iter().fold(100i64, |acc, d| acc.saturating_sub(*d));
    u32::try_from(score.clamp(0, 100)).unwrap_or(0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_f64(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0) as u32
}
