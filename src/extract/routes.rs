//! Route declarations: JSX route tags, route objects and `useRoute` hooks.

use super::{LineIndex, Rule, RuleTable};
use crate::paths::{classify_zone, normalize};
use crate::types::{RouteDeclaration, SourceFile};
use regex::Regex;
use std::sync::LazyLock;

/// Opening `<Route>`/`<ProtectedRoute>` tag. Quoted strings and up to two
/// levels of braces are consumed whole, so `element={<X />}` stays inside `attrs`.
const ROUTE_TAG: &str = r#"<(?:Route|ProtectedRoute)\b(?P<attrs>(?:[^>"'{}]|"[^"]*"|'[^']*'|\{(?:[^{}]|\{[^{}]*\})*\})*?)(?P<close>/?)>"#;

const PATH_SPELLINGS: &[Rule] = &[
    Rule::new("path-double-quoted", r#"\bpath\s*=\s*"(?P<v>[^"]*)""#),
    Rule::new("path-single-quoted", r"\bpath\s*=\s*'(?P<v>[^']*)'"),
    Rule::new("path-braced-double", r#"\bpath\s*=\s*\{\s*"(?P<v>[^"]*)"\s*\}"#),
    Rule::new("path-braced-single", r"\bpath\s*=\s*\{\s*'(?P<v>[^']*)'\s*\}"),
    Rule::new("path-template", r"\bpath\s*=\s*\{\s*`(?P<v>[^`$]*)`\s*\}"),
];

const COMPONENT_SPELLINGS: &[Rule] = &[
    Rule::new("component-attr", r"\bcomponent\s*=\s*\{\s*(?P<v>[A-Za-z][\w.]*)\s*\}"),
    Rule::new("element-attr", r"\belement\s*=\s*\{?\s*<\s*(?P<v>[A-Za-z]\w*)"),
    Rule::new("render-attr", r"=>\s*\(?\s*<\s*(?P<v>[A-Za-z]\w*)"),
];

const CHILD_SPELLINGS: &[Rule] = &[
    Rule::new("child-render-fn", r"^\s*\{\s*\([^)]*\)\s*=>\s*\(?\s*<\s*(?P<v>[A-Za-z]\w*)"),
    Rule::new("child-element", r"^\s*<\s*(?P<v>[A-Za-z]\w*)"),
];

const STANDALONE: &[Rule] = &[
    Rule::new("route-object", r#"["']?\bpath["']?\s*:\s*["'](?P<v>[^"']+)["']"#),
    Rule::new("use-route", r#"\buseRoute\(\s*["'](?P<v>[^"']+)["']\s*\)"#),
];

/// Key that makes an object literal with `path:` a route config entry.
const OBJECT_COMPONENT: &[Rule] = &[Rule::new(
    "object-component",
    r#"["']?\b(?:component|element|Component)["']?\s*:\s*(?:<\s*)?(?P<v>[A-Za-z][\w.]*)"#,
)];

static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(ROUTE_TAG).ok());
static PATHS: LazyLock<RuleTable> = LazyLock::new(|| RuleTable::compile(PATH_SPELLINGS));
static COMPONENTS: LazyLock<RuleTable> =
    LazyLock::new(|| RuleTable::compile(COMPONENT_SPELLINGS));
static CHILDREN: LazyLock<RuleTable> = LazyLock::new(|| RuleTable::compile(CHILD_SPELLINGS));
static OBJECTS: LazyLock<RuleTable> = LazyLock::new(|| RuleTable::compile(STANDALONE));
static OBJECT_COMPONENTS: LazyLock<RuleTable> =
    LazyLock::new(|| RuleTable::compile(OBJECT_COMPONENT));

/// One route tag, with or without a path. Path-less tags are fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTag {
    pub start: usize,
    pub end: usize,
    pub path: Option<String>,
    /// Rule that matched the path spelling.
    pub path_rule: Option<&'static str>,
    pub component: Option<String>,
}

/// Every route tag in `text`, in source order.
#[must_use]
pub fn route_tags(text: &str) -> Vec<RouteTag> {
    let Some(tag_re) = TAG_RE.as_ref() else {
        return Vec::new();
    };
    tag_re
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.name("attrs").map_or("", |m| m.as_str());
            let self_closing = caps.name("close").is_some_and(|m| !m.as_str().is_empty());
            let component = component_of(attrs)
                .or_else(|| (!self_closing).then(|| child_of(&text[whole.end()..])).flatten());
            let path = PATHS.first_value(attrs);
            Some(RouteTag {
                start: whole.start(),
                end: whole.end(),
                path: path.map(|(_, m)| m.as_str().to_string()),
                path_rule: path.map(|(rule, _)| rule),
                component,
            })
        })
        .collect()
}

/// Extracts route declarations from one frontend file.
#[must_use]
pub fn extract(file: &SourceFile) -> Vec<RouteDeclaration> {
    let text = file.text.as_str();
    let lines = LineIndex::new(text);
    let mut out = Vec::new();

    for tag in route_tags(text) {
        if let (Some(path), Some(rule)) = (tag.path.as_deref(), tag.path_rule) {
            push(&mut out, file, path, tag.component.clone(), lines.line(tag.start), rule);
        }
    }

    for (rule, re) in OBJECTS.iter() {
        for caps in re.captures_iter(text) {
            let Some(v) = caps.name("v") else { continue };
            let component = if rule == "route-object" {
                // Menus and breadcrumbs carry `path:` too; only entries that bind a component count.
                let Some(component) = object_component(text, v.start()) else {
                    continue;
                };
                component
            } else {
                None
            };
            push(&mut out, file, v.as_str(), component, lines.line(v.start()), rule);
        }
    }
    out
}

/// Component key of the object literal enclosing `pos`. The outer `None`
/// means the object binds no component; the inner one a lazy or computed value.
fn object_component(text: &str, pos: usize) -> Option<Option<String>> {
    let body = enclosing_object(text, pos)?;
    let (_, m) = OBJECT_COMPONENTS.first_value(body)?;
    let name = clean_component(m.as_str());
    Some((!name.is_empty() && name != "lazy").then_some(name))
}

/// Text between the braces of the innermost object literal around `pos`.
fn enclosing_object(text: &str, pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut start = None;
    for i in (0..pos).rev() {
        match bytes[i] {
            b'}' => depth += 1,
            b'{' if depth == 0 => {
                start = Some(i + 1);
                break;
            }
            b'{' => depth -= 1,
            _ => {}
        }
    }
    let start = start?;
    depth = 0;
    for (i, b) in bytes.iter().copied().enumerate().skip(pos) {
        match b {
            b'{' => depth += 1,
            b'}' if depth == 0 => return text.get(start..i),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn component_of(attrs: &str) -> Option<String> {
    COMPONENTS
        .first_value(attrs)
        .map(|(_, m)| clean_component(m.as_str()))
        .filter(|c| !c.is_empty())
}

fn child_of(after: &str) -> Option<String> {
    CHILDREN
        .first_value(after)
        .map(|(_, m)| m.as_str())
        .filter(|c| !matches!(*c, "Route" | "ProtectedRoute"))
        .map(clean_component)
}

/// `Pages.Home` binds `Home`; anything but identifier chars is dropped.
#[must_use]
pub fn clean_component(raw: &str) -> String {
    let last = raw.rsplit('.').next().unwrap_or(raw);
    last.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn push(
    out: &mut Vec<RouteDeclaration>,
    file: &SourceFile,
    raw: &str,
    component: Option<String>,
    line: usize,
    rule: &'static str,
) {
    let raw = raw.trim();
    if raw.starts_with("${") || raw.starts_with('{') || raw.starts_with('#') || raw.starts_with("http") {
        return;
    }
    let Some(pattern) = normalize(raw) else {
        return;
    };
    if !pattern.starts_with('/') {
        return;
    }
    out.push(RouteDeclaration {
        zone: classify_zone(&pattern),
        pattern,
        component,
        file: file.path.clone(),
        line,
        rule,
    });
}
