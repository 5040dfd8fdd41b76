//! Navigational link targets written as literals.

use super::{LineIndex, Rule, RuleTable};
use crate::paths::{file_zone, has_segment_prefix};
use crate::types::{LinkKind, LinkReference, SourceFile};
use std::sync::LazyLock;

const LINK_RULES: &[(LinkKind, Rule)] = &[
    (
        LinkKind::LinkComponent,
        Rule::new("link-href", r#"<(?:Link|NavLink)\b[^>]*?\b(?:href|to)\s*=\s*["'](?P<v>[^"']+)["']"#),
    ),
    (
        LinkKind::LinkComponent,
        Rule::new(
            "link-href-braced",
            r#"<(?:Link|NavLink)\b[^>]*?\b(?:href|to)\s*=\s*\{\s*["'](?P<v>[^"']+)["']\s*\}"#,
        ),
    ),
    (
        LinkKind::Anchor,
        Rule::new("anchor-href", r#"<a\b[^>]*?\bhref\s*=\s*["'](?P<v>[^"']+)["']"#),
    ),
    (
        LinkKind::Anchor,
        Rule::new("anchor-href-braced", r#"<a\b[^>]*?\bhref\s*=\s*\{\s*["'](?P<v>[^"']+)["']\s*\}"#),
    ),
    (
        LinkKind::NavigationCall,
        Rule::new("set-location", r#"\bsetLocation\(\s*["'](?P<v>[^"']+)["']\s*[,)]"#),
    ),
    (
        LinkKind::NavigationCall,
        Rule::new("navigate", r#"\bnavigate\(\s*["'](?P<v>[^"']+)["']\s*[,)]"#),
    ),
    (
        LinkKind::NavigationCall,
        Rule::new(
            "router-push",
            r#"\b(?:router|history)\.(?:push|replace)\(\s*["'](?P<v>[^"']+)["']\s*[,)]"#,
        ),
    ),
    (
        LinkKind::NavigationCall,
        Rule::new(
            "location-assign",
            r#"\b(?:window\.location|location\.href)\s*=\s*["'](?P<v>[^"']+)["']"#,
        ),
    ),
];

static TABLE: LazyLock<(Vec<LinkKind>, RuleTable)> = LazyLock::new(|| {
    let rules: Vec<Rule> = LINK_RULES.iter().map(|(_, r)| *r).collect();
    let table = RuleTable::compile(&rules);
    let kinds = table
        .iter()
        .filter_map(|(name, _)| LINK_RULES.iter().find(|(_, r)| r.name == name).map(|(k, _)| *k))
        .collect();
    (kinds, table)
});

/// Byte span of a link literal inside its file. Rewrites touch only this span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub target: String,
    pub start: usize,
    pub end: usize,
    pub kind: LinkKind,
    pub rule: &'static str,
}

/// Every literal captured by a link rule, ordered by position, one per span.
#[must_use]
pub fn spans(text: &str) -> Vec<LinkSpan> {
    let (kinds, table) = &*TABLE;
    let mut out: Vec<LinkSpan> = Vec::new();
    for ((rule, re), kind) in table.iter().zip(kinds) {
        for caps in re.captures_iter(text) {
            if let Some(v) = caps.name("v") {
                out.push(LinkSpan {
                    target: v.as_str().to_string(),
                    start: v.start(),
                    end: v.end(),
                    kind: *kind,
                    rule,
                });
            }
        }
    }
    out.sort_by_key(|s| s.start);
    out.dedup_by_key(|s| s.start);
    out
}

/// True for an internal absolute path that is not under an ignored prefix.
#[must_use]
pub fn is_navigational(target: &str, ignored_prefixes: &[String]) -> bool {
    let t = target.trim();
    if t.is_empty() || !t.starts_with('/') || t.starts_with("//") {
        return false;
    }
    !ignored_prefixes.iter().any(|p| has_segment_prefix(t, p))
}

#[must_use]
pub fn extract(file: &SourceFile, ignored_prefixes: &[String]) -> Vec<LinkReference> {
    let lines = LineIndex::new(&file.text);
    let zone = file_zone(&file.path);
    spans(&file.text)
        .into_iter()
        .filter(|s| is_navigational(&s.target, ignored_prefixes))
        .map(|s| LinkReference {
            line: lines.line(s.start),
            target: s.target,
            file: file.path.clone(),
            kind: s.kind,
            zone,
            rule: s.rule,
        })
        .collect()
}
