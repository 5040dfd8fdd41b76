//! Correspondence graphs and their deltas.
//!
//! All deltas are plain set differences over a fully extracted [`FactSet`].

use crate::config::Config;
use crate::extract::routes::{clean_component, route_tags};
use crate::paths::{normalize, split_suffix, MatchOutcome, RouteSet};
use crate::types::{
    FactSet, LanguageClass, LinkReference, RouteDeclaration, RpcProcedure, SourceFile, SourceSet,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How a proposed link repair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Repair {
    CaseCorrection,
    CloseMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    #[serde(flatten)]
    pub link: LinkReference,
    pub normalized: String,
    /// Normalized replacement path, when one is certain enough.
    pub suggestion: Option<String>,
    pub repair: Option<Repair>,
}

/// A link that matches only after its trailing slash is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonCanonicalLink {
    #[serde(flatten)]
    pub link: LinkReference,
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanPage {
    pub file: String,
    pub component: String,
    pub suggested_route: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostCall {
    pub namespace: String,
    pub name: String,
    /// First call-site by file then line.
    pub file: String,
    pub line: usize,
    pub usages: usize,
    pub methods: BTreeSet<String>,
}

impl GhostCall {
    #[must_use]
    pub fn qualified(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveProcedure {
    #[serde(flatten)]
    pub procedure: RpcProcedure,
    pub verb: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedComponent {
    pub pattern: String,
    pub component: String,
    pub file: String,
    pub line: usize,
}

/// Every delta of one run.
#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    pub route_set: RouteSet,
    pub broken_links: Vec<BrokenLink>,
    pub non_canonical_links: Vec<NonCanonicalLink>,
    pub orphan_pages: Vec<OrphanPage>,
    pub ghost_calls: Vec<GhostCall>,
    pub dead_procedures: Vec<RpcProcedure>,
    pub sensitive_public: Vec<SensitiveProcedure>,
    pub unmatched_components: Vec<UnmatchedComponent>,
    /// File that owns route registration, if one can be identified.
    pub routing_file: Option<String>,
    /// A routing file with content produced no routes.
    pub routing_file_without_routes: bool,
}

impl CrossReference {
    #[must_use]
    pub fn build(facts: &FactSet, sources: &SourceSet, config: &Config) -> Self {
        let route_set = RouteSet::new(
            facts.routes.iter().map(|r| r.pattern.clone()),
            config.rules.similarity_threshold,
        );
        let (broken_links, non_canonical_links) = link_deltas(&facts.links, &route_set);
        let pages = page_components(sources);
        let routing_file = routing_file(sources, &facts.routes, &config.scan.route_file_hints);
        let routing_file_without_routes = facts.routes.is_empty()
            && routing_file
                .as_deref()
                .and_then(|p| sources.get(p))
                .is_some_and(|f| !f.text.trim().is_empty());

        Self {
            broken_links,
            non_canonical_links,
            orphan_pages: orphan_pages(&pages, &bound_components(facts, sources)),
            ghost_calls: ghost_calls(facts),
            dead_procedures: dead_procedures(facts),
            sensitive_public: sensitive_public(&facts.procedures, &config.rules.sensitive_verbs),
            unmatched_components: unmatched_components(&facts.routes, &pages),
            routing_file,
            routing_file_without_routes,
            route_set,
        }
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

fn link_deltas(
    links: &[LinkReference],
    routes: &RouteSet,
) -> (Vec<BrokenLink>, Vec<NonCanonicalLink>) {
    let mut broken = Vec::new();
    let mut non_canonical = Vec::new();
    for link in links {
        let Some(normalized) = normalize(&link.target) else {
            continue;
        };
        let outcome = routes.matches(&normalized);
        if outcome.is_match() {
            let (bare, _) = split_suffix(link.target.trim());
            if bare != normalized {
                non_canonical.push(NonCanonicalLink {
                    link: link.clone(),
                    canonical: normalized,
                });
            }
            continue;
        }
        let repair = match &outcome {
            MatchOutcome::CaseMismatch(_) => Some(Repair::CaseCorrection),
            MatchOutcome::NoMatch { suggestion: Some(_) } => Some(Repair::CloseMatch),
            _ => None,
        };
        broken.push(BrokenLink {
            link: link.clone(),
            suggestion: outcome.correction().map(str::to_string),
            repair,
            normalized,
        });
    }
    (broken, non_canonical)
}

/// Component name a page file is expected to export.
#[must_use]
pub fn page_component(file: &SourceFile) -> String {
    let stem = file.stem();
    if stem.eq_ignore_ascii_case("index") {
        let parent = file.path.rsplit('/').nth(1).unwrap_or(stem);
        return pascal_case(parent);
    }
    clean_component(stem)
}

fn page_components(sources: &SourceSet) -> Vec<(String, String)> {
    sources
        .pages()
        .map(|f| (f.path.clone(), page_component(f)))
        .filter(|(_, c)| !c.is_empty())
        .collect()
}

/// Components bound by any route tag, including path-less fallbacks.
fn bound_components(facts: &FactSet, sources: &SourceSet) -> BTreeSet<String> {
    let mut bound: BTreeSet<String> = facts
        .routes
        .iter()
        .filter_map(|r| r.component.as_deref())
        .map(str::to_ascii_lowercase)
        .collect();
    for file in sources.of_class(LanguageClass::Frontend) {
        bound.extend(
            route_tags(&file.text)
                .into_iter()
                .filter_map(|t| t.component)
                .map(|c| c.to_ascii_lowercase()),
        );
    }
    bound
}

fn orphan_pages(pages: &[(String, String)], bound: &BTreeSet<String>) -> Vec<OrphanPage> {
    pages
        .iter()
        .filter(|(_, c)| !bound.contains(&c.to_ascii_lowercase()))
        .map(|(file, component)| OrphanPage {
            file: file.clone(),
            component: component.clone(),
            suggested_route: guess_route(component),
        })
        .collect()
}

fn unmatched_components(
    routes: &[RouteDeclaration],
    pages: &[(String, String)],
) -> Vec<UnmatchedComponent> {
    let known: BTreeSet<String> = pages.iter().map(|(_, c)| c.to_ascii_lowercase()).collect();
    routes
        .iter()
        .filter_map(|r| {
            let component = r.component.as_ref()?;
            (!known.contains(&component.to_ascii_lowercase())).then(|| UnmatchedComponent {
                pattern: r.pattern.clone(),
                component: component.clone(),
                file: r.file.clone(),
                line: r.line,
            })
        })
        .collect()
}

fn ghost_calls(facts: &FactSet) -> Vec<GhostCall> {
    let declared: BTreeSet<(&str, &str)> = facts.procedures.iter().map(RpcProcedure::key).collect();
    let mut ghosts: BTreeMap<(&str, &str), GhostCall> = BTreeMap::new();
    for usage in facts.usages.iter().filter(|u| !declared.contains(&u.key())) {
        let entry = ghosts.entry(usage.key()).or_insert_with(|| GhostCall {
            namespace: usage.namespace.clone(),
            name: usage.name.clone(),
            file: usage.file.clone(),
            line: usage.line,
            usages: 0,
            methods: BTreeSet::new(),
        });
        if (usage.file.as_str(), usage.line) < (entry.file.as_str(), entry.line) {
            entry.file.clone_from(&usage.file);
            entry.line = usage.line;
        }
        entry.usages += 1;
        entry.methods.insert(usage.method.clone());
    }
    ghosts.into_values().collect()
}

fn dead_procedures(facts: &FactSet) -> Vec<RpcProcedure> {
    let used: BTreeSet<(&str, &str)> = facts.usages.iter().map(|u| u.key()).collect();
    facts
        .procedures
        .iter()
        .filter(|p| !used.contains(&p.key()))
        .cloned()
        .collect()
}

fn sensitive_public(procedures: &[RpcProcedure], verbs: &[String]) -> Vec<SensitiveProcedure> {
    procedures
        .iter()
        .filter(|p| p.access == crate::types::AccessKind::Public)
        .filter_map(|p| {
            let lower = p.name.to_ascii_lowercase();
            let verb = verbs.iter().find(|v| lower.contains(&v.to_ascii_lowercase()))?;
            Some(SensitiveProcedure {
                procedure: p.clone(),
                verb: verb.clone(),
            })
        })
        .collect()
}

/// First routing hint that declares routes, else the file declaring the most
/// routes. With no routes at all, the first routing hint present.
fn routing_file(
    sources: &SourceSet,
    routes: &[RouteDeclaration],
    hints: &[String],
) -> Option<String> {
    let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
    for r in routes {
        *per_file.entry(r.file.as_str()).or_default() += 1;
    }
    if let Some(hint) = hints.iter().find(|h| per_file.contains_key(h.as_str())) {
        return Some(hint.clone());
    }
    per_file
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(f, _)| f.to_string())
        .or_else(|| hints.iter().find(|h| sources.get(h).is_some()).cloned())
}

/// Conventional route for a page component: `AdminUsers` maps to `/admin/users`.
#[must_use]
pub fn guess_route(component: &str) -> String {
    let kebab = kebab_case(component);
    match kebab.as_str() {
        "home" | "index" | "landing" => "/".to_string(),
        "not-found" | "notfound" => "/404".to_string(),
        other => match other.strip_prefix("admin-") {
            Some(rest) => format!("/admin/{rest}"),
            None => format!("/{other}"),
        },
    }
}

#[must_use]
pub fn kebab_case(name: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = name.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(*c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// `course-detail` and `course_detail` become `CourseDetail`.
#[must_use]
pub fn pascal_case(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessKind, LinkKind, RpcMethodKind, RpcUsage, Zone};

    fn link(target: &str) -> LinkReference {
        LinkReference {
            target: target.to_string(),
            file: "client/src/Nav.tsx".to_string(),
            line: 1,
            kind: LinkKind::LinkComponent,
            zone: Zone::Public,
            rule: "link-href",
        }
    }

    fn usage(ns: &str, name: &str, file: &str, line: usize) -> RpcUsage {
        RpcUsage {
            namespace: ns.to_string(),
            name: name.to_string(),
            method: "mutate".to_string(),
            kind: RpcMethodKind::Mutation,
            file: file.to_string(),
            line,
        }
    }

    fn procedure(ns: &str, name: &str, access: AccessKind) -> RpcProcedure {
        RpcProcedure {
            namespace: ns.to_string(),
            name: name.to_string(),
            access,
            file: "server/routers.ts".to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_broken_and_non_canonical() {
        let routes = RouteSet::new(["/", "/courses", "/courses/:slug"], 0.8);
        let links = [link("/Courses"), link("/courses/"), link("/courses/x?y=1"), link("/nowhere")];
        let (broken, non_canonical) = link_deltas(&links, &routes);
        assert_eq!(broken.len(), 2);
        assert_eq!(broken[0].suggestion.as_deref(), Some("/courses"));
        assert_eq!(broken[0].repair, Some(Repair::CaseCorrection));
        assert_eq!(broken[1].suggestion, None);
        assert_eq!(non_canonical.len(), 1);
        assert_eq!(non_canonical[0].canonical, "/courses");
    }

    #[test]
    fn test_ghost_calls_group_by_procedure() {
        let facts = FactSet {
            procedures: vec![procedure("billing", "createInvoice", AccessKind::Protected)],
            usages: vec![
                usage("billing", "createInvoice", "a.tsx", 3),
                usage("billing", "refund", "b.tsx", 9),
                usage("billing", "refund", "a.tsx", 7),
            ],
            ..FactSet::default()
        };
        let ghosts = ghost_calls(&facts);
        assert_eq!(ghosts.len(), 1);
        assert_eq!(ghosts[0].qualified(), "billing.refund");
        assert_eq!((ghosts[0].file.as_str(), ghosts[0].line), ("a.tsx", 7));
        assert_eq!(ghosts[0].usages, 2);
        assert!(dead_procedures(&facts).is_empty());
    }

    #[test]
    fn test_sensitive_public_procedure() {
        let procs = [
            procedure("users", "deleteUser", AccessKind::Public),
            procedure("users", "deleteUser2", AccessKind::Protected),
            procedure("posts", "list", AccessKind::Public),
        ];
        let verbs = vec!["delete".to_string()];
        let flagged = sensitive_public(&procs, &verbs);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].verb, "delete");
    }

    #[test]
    fn test_route_guessing() {
        assert_eq!(guess_route("Home"), "/");
        assert_eq!(guess_route("AdminUsers"), "/admin/users");
        assert_eq!(guess_route("CourseDetail"), "/course-detail");
        assert_eq!(kebab_case("FAQPage"), "faq-page");
        assert_eq!(pascal_case("course-detail"), "CourseDetail");
    }
}
