//! Audit entry points: load, extract, cross-reference, score, report.

use crate::config::{Config, ScanConfig};
use crate::discovery::load_sources;
use crate::error::Result;
use crate::extract::extract_all;
use crate::report::{build_issues, Report};
use crate::scoring::{compute, ScoreInputs};
use crate::types::SourceSet;
use crate::xref::CrossReference;
use std::path::Path;
use tracing::info;

/// Audits `root` with the given scan settings and default rules.
///
/// # Errors
/// Returns error if the scan globs are invalid.
pub fn audit(root: &Path, scan: &ScanConfig) -> Result<Report> {
    let config = Config {
        scan: scan.clone(),
        ..Config::default()
    };
    audit_with_config(root, &config)
}

/// Audits `root` with a complete configuration.
///
/// # Errors
/// Returns error if the scan globs are invalid.
pub fn audit_with_config(root: &Path, config: &Config) -> Result<Report> {
    let sources = load_sources(root, &config.scan)?;
    Ok(analyze(&sources, config))
}

/// Pure analysis over an already loaded source set.
#[must_use]
pub fn analyze(sources: &SourceSet, config: &Config) -> Report {
    let facts = extract_all(sources, config);
    let xref = CrossReference::build(&facts, sources, config);
    let issues = build_issues(&facts, &xref, config);
    let inputs = ScoreInputs::collect(&xref, &facts, &issues);
    let scores = compute(&inputs, &config.weights, &config.penalties);
    info!(
        files = sources.len(),
        issues = issues.len(),
        overall = scores.overall,
        "audit complete"
    );
    Report::new(sources.len(), facts, xref, issues, scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LanguageClass, Severity, SourceFile};

    fn frontend(path: &str, text: &str) -> SourceFile {
        SourceFile::new(path, text).with_class(LanguageClass::Frontend)
    }

    #[test]
    fn test_case_mismatch_reported_with_fix() {
        let sources = SourceSet::new(vec![
            frontend(
                "client/src/App.tsx",
                r#"<Route path="/" component={Home} />
<Route path="/courses" component={Courses} />
<Route path="/courses/:slug" component={CourseDetail} />"#,
            ),
            frontend("client/src/components/Nav.tsx", r#"<Link href="/Courses">Courses</Link>"#),
        ]);
        let report = analyze(&sources, &Config::default());
        assert_eq!(report.broken_links.len(), 1);
        assert_eq!(report.broken_links[0].suggestion.as_deref(), Some("/courses"));
        let issue = report
            .issues
            .iter()
            .find(|i| i.title == "Broken link: /Courses")
            .map(|i| (i.severity, i.fix_available));
        assert_eq!(issue, Some((Severity::Warning, true)));
    }

    #[test]
    fn test_empty_source_set_still_reports() {
        let report = analyze(&SourceSet::default(), &Config::default());
        assert_eq!(report.counts.files, 0);
        assert_eq!(report.scores.navigation, 60);
        assert_eq!(report.outstanding_critical(), 1);
    }
}
