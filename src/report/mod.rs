//! Issue reporter and the report object handed to serializers.

pub mod console;
pub mod json;

use crate::config::Config;
use crate::fix::{Fix, FixStatus};
use crate::scoring::Scores;
use crate::types::{
    Category, FactSet, HitKind, Issue, PatternHit, RouteDeclaration, RpcProcedure, SchemaTable,
    Severity, Zone,
};
use crate::xref::{
    BrokenLink, CrossReference, GhostCall, NonCanonicalLink, OrphanPage, Repair,
    SensitiveProcedure, UnmatchedComponent,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub files: usize,
    pub routes: usize,
    pub links: usize,
    pub broken_links: usize,
    pub non_canonical_links: usize,
    pub orphan_pages: usize,
    pub procedures: usize,
    pub usages: usize,
    pub ghost_calls: usize,
    pub dead_procedures: usize,
    pub schema_tables: usize,
    pub issues: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub fixes_applied: usize,
}

/// Route patterns grouped by zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RouteZones {
    pub public: Vec<String>,
    pub auth: Vec<String>,
    pub admin: Vec<String>,
}

/// Complete result of one audit. Field names are the serializer contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub scores: Scores,
    pub counts: Counts,
    pub routes: Vec<RouteDeclaration>,
    pub broken_links: Vec<BrokenLink>,
    pub orphan_pages: Vec<OrphanPage>,
    pub ghost_calls: Vec<GhostCall>,
    pub dead_procedures: Vec<RpcProcedure>,
    pub issues: Vec<Issue>,
    pub applied_fixes: Vec<Fix>,
    pub non_canonical_links: Vec<NonCanonicalLink>,
    pub unmatched_components: Vec<UnmatchedComponent>,
    pub sensitive_procedures: Vec<SensitiveProcedure>,
    pub schema_tables: Vec<SchemaTable>,
    pub route_zones: RouteZones,
    pub routing_file: Option<String>,
}

impl Report {
    #[must_use]
    pub fn new(
        files: usize,
        facts: FactSet,
        xref: CrossReference,
        issues: Vec<Issue>,
        scores: Scores,
    ) -> Self {
        let mut zones = RouteZones::default();
        for r in &facts.routes {
            let bucket = match r.zone {
                Zone::Public => &mut zones.public,
                Zone::Auth => &mut zones.auth,
                Zone::Admin => &mut zones.admin,
            };
            if !bucket.contains(&r.pattern) {
                bucket.push(r.pattern.clone());
            }
        }
        let counts = Counts {
            files,
            routes: facts.routes.len(),
            links: facts.links.len(),
            broken_links: xref.broken_links.len(),
            non_canonical_links: xref.non_canonical_links.len(),
            orphan_pages: xref.orphan_pages.len(),
            procedures: facts.procedures.len(),
            usages: facts.usages.len(),
            ghost_calls: xref.ghost_calls.len(),
            dead_procedures: xref.dead_procedures.len(),
            schema_tables: facts.tables.len(),
            ..Counts::default()
        };
        let mut report = Self {
            scores,
            counts,
            routes: facts.routes,
            broken_links: xref.broken_links,
            orphan_pages: xref.orphan_pages,
            ghost_calls: xref.ghost_calls,
            dead_procedures: xref.dead_procedures,
            issues,
            applied_fixes: Vec::new(),
            non_canonical_links: xref.non_canonical_links,
            unmatched_components: xref.unmatched_components,
            sensitive_procedures: xref.sensitive_public,
            schema_tables: facts.tables,
            route_zones: zones,
            routing_file: xref.routing_file,
        };
        report.recount();
        report
    }

    /// Records applied fixes and flags the issues they resolved.
    pub fn attach_fixes(&mut self, fixes: &[Fix]) {
        for fix in fixes.iter().filter(|f| f.status == FixStatus::Applied) {
            for target in &fix.resolves {
                for issue in &mut self.issues {
                    if issue.file == target.file && issue.subject.as_deref() == Some(target.subject.as_str()) {
                        issue.fix_applied = true;
                    }
                }
            }
            self.applied_fixes.push(fix.clone());
        }
        self.recount();
    }

    /// CRITICAL issues not resolved by an applied fix.
    #[must_use]
    pub fn outstanding_critical(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical && !i.fix_applied)
            .count()
    }

    fn recount(&mut self) {
        let sev = |s| self.issues.iter().filter(|i| i.severity == s).count();
        self.counts.critical = sev(Severity::Critical);
        self.counts.warning = sev(Severity::Warning);
        self.counts.info = sev(Severity::Info);
        self.counts.issues = self.issues.len();
        self.counts.fixes_applied = self.applied_fixes.len();
    }
}

/// Converts every delta and raw hit into issues, deterministically ordered.
#[must_use]
pub fn build_issues(facts: &FactSet, xref: &CrossReference, config: &Config) -> Vec<Issue> {
    let mut issues = Vec::new();

    if facts.routes.is_empty() {
        issues.push(no_routes_issue(xref));
    }
    issues.extend(xref.broken_links.iter().map(broken_link_issue));
    issues.extend(xref.non_canonical_links.iter().map(|n| {
        Issue::new(Severity::Info, Category::Navigation, &n.link.file, n.link.line, format!("Non-canonical link: {}", n.link.target))
            .detail(format!("Resolves to `{}` only after dropping the trailing slash", n.canonical))
            .hint(format!("Write the canonical path `{}`", n.canonical))
            .fixable(true)
            .subject(&n.link.target)
    }));
    issues.extend(xref.orphan_pages.iter().map(|o| {
        Issue::new(Severity::Warning, Category::Navigation, &o.file, 0, format!("Orphan page: {}", o.component))
            .detail("No route binds this page component")
            .hint(format!(
                "Register <Route path=\"{}\" component={{{}}} /> or delete the page",
                o.suggested_route, o.component
            ))
            .fixable(true)
            .subject(&o.component)
    }));
    issues.extend(xref.unmatched_components.iter().map(|u| {
        Issue::new(Severity::Info, Category::Navigation, &u.file, u.line, format!("Route component without page: {}", u.component))
            .detail(format!("`{}` is bound to {} but no page file exports it", u.component, u.pattern))
            .hint("Check that the component is imported from a page module")
            .subject(&u.component)
    }));
    issues.extend(xref.ghost_calls.iter().map(|g| ghost_issue(g, config.rules.ghost_call_severity)));
    issues.extend(xref.dead_procedures.iter().map(|p| {
        Issue::new(config.rules.dead_procedure_severity, Category::RpcAlignment, &p.file, p.line, format!("Dead RPC procedure: {}", p.qualified()))
            .detail(format!("{} procedure is never called from the frontend", p.access.label()))
            .hint("Remove the procedure or wire it into the UI")
            .subject(p.qualified())
    }));
    issues.extend(xref.sensitive_public.iter().map(|s| {
        let p = &s.procedure;
        Issue::new(Severity::Warning, Category::RpcSecurity, &p.file, p.line, format!("Public procedure with sensitive name: {}", p.qualified()))
            .detail(format!("Name contains `{}` but the procedure needs no authentication", s.verb))
            .hint("Use protectedProcedure or adminProcedure unless anonymous access is intended")
            .subject(p.qualified())
    }));
    issues.extend(facts.hits.iter().map(hit_issue));

    sort_issues(&mut issues);
    issues
}

/// Severity, then file, then line. Title breaks remaining ties.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        (a.severity, &a.file, a.line, &a.title).cmp(&(b.severity, &b.file, b.line, &b.title))
    });
}

fn no_routes_issue(xref: &CrossReference) -> Issue {
    let file = xref.routing_file.clone().unwrap_or_default();
    let detail = if xref.routing_file_without_routes {
        format!("{file} has content but no route declaration was recognized")
    } else {
        "No route declaration was found in any frontend file".to_string()
    };
    Issue::new(Severity::Critical, Category::Navigation, file, 0, "No routes detected")
        .detail(detail)
        .hint("Declare routes with <Route path=\"/x\" component={X} /> in the routing file")
}

fn broken_link_issue(b: &BrokenLink) -> Issue {
    let severity = if b.link.zone == Zone::Admin {
        Severity::Critical
    } else {
        Severity::Warning
    };
    let why = match b.repair {
        Some(Repair::CaseCorrection) => " (case mismatch)",
        Some(Repair::CloseMatch) => " (close match)",
        _ => "",
    };
    let hint = match &b.suggestion {
        Some(s) => format!("Replace with `{s}`{why}"),
        None => format!("Declare a route for `{}` or remove the link", b.normalized),
    };
    Issue::new(severity, Category::Navigation, &b.link.file, b.link.line, format!("Broken link: {}", b.link.target))
        .detail(format!("`{}` matches no declared route", b.normalized))
        .hint(hint)
        .fixable(b.suggestion.is_some())
        .subject(&b.link.target)
}

fn ghost_issue(g: &GhostCall, severity: Severity) -> Issue {
    let methods: Vec<&str> = g.methods.iter().map(String::as_str).collect();
    Issue::new(severity, Category::RpcAlignment, &g.file, g.line, format!("Ghost RPC call: {}", g.qualified()))
        .detail(format!(
            "{} call-site(s) via {} but no backend procedure is declared",
            g.usages,
            methods.join(", ")
        ))
        .hint(format!("Declare `{}` on the backend router or remove the call", g.qualified()))
        .subject(g.qualified())
}

fn hit_issue(h: &PatternHit) -> Issue {
    let (severity, category, title, hint, fixable) = match h.kind {
        HitKind::HardcodedSecret => (
            Severity::Critical,
            Category::Security,
            "Hardcoded secret",
            "Move the value to an environment variable",
            false,
        ),
        HitKind::OpenRedirect => (
            Severity::Critical,
            Category::Security,
            "Open redirect via `next`",
            "Validate `next` against an allow-list of internal paths",
            false,
        ),
        HitKind::AuthBypassLink => (
            Severity::Warning,
            Category::Auth,
            "Direct auth-provider link",
            "Send users through the login gateway (/login?provider=...)",
            true,
        ),
        HitKind::HardcodedLocalhost => (
            Severity::Warning,
            Category::Security,
            "Hardcoded localhost or dev port",
            "Read the host from configuration",
            false,
        ),
        HitKind::HardcodedApiUrl => (
            Severity::Warning,
            Category::Security,
            "Hardcoded API URL",
            "Use a relative path or a configured base URL",
            false,
        ),
        HitKind::TodoMarker => (
            Severity::Info,
            Category::CodeQuality,
            "Outstanding TODO marker",
            "Resolve or track the marker",
            false,
        ),
        HitKind::ExcessDebugLog => (
            Severity::Info,
            Category::CodeQuality,
            "Excess console.log calls",
            "Remove debug logging or use a logger",
            false,
        ),
    };
    Issue::new(severity, category, &h.file, h.line, title)
        .detail(h.snippet.clone())
        .hint(hint)
        .fixable(fixable)
        .subject(&h.snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_order() {
        let mut issues = vec![
            Issue::new(Severity::Info, Category::CodeQuality, "a.ts", 1, "i"),
            Issue::new(Severity::Critical, Category::Navigation, "z.ts", 9, "c2"),
            Issue::new(Severity::Warning, Category::Security, "b.ts", 2, "w"),
            Issue::new(Severity::Critical, Category::Navigation, "z.ts", 3, "c1"),
        ];
        sort_issues(&mut issues);
        let titles: Vec<&str> = issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["c1", "c2", "w", "i"]);
    }

    #[test]
    fn test_zero_routes_is_critical() {
        let facts = FactSet::default();
        let xref = CrossReference::default();
        let issues = build_issues(&facts, &xref, &Config::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].title, "No routes detected");
    }
}
