//! Stub pages for missing targets and route registration for unbound pages.

use super::rewrite::{splice, Edit};
use crate::config::AutofixConfig;
use crate::extract::routes::{route_tags, RouteTag};
use crate::paths::segments;
use crate::xref::pascal_case;
use std::path::Path;

const PAGE_DIR_CANDIDATES: &[&str] = &["client/src/pages", "src/pages"];
const CLOSING_TAGS: &[&str] = &["</Switch>", "</Routes>"];
const INDENT: &str = "  ";

/// A page to create for a link target nothing serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubPage {
    pub file: String,
    pub component: String,
    pub route: String,
}

/// A route line to register in the routing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: String,
    pub component: String,
    pub page_file: String,
}

/// Configured pages directory, else the first that exists, else `src/pages`.
#[must_use]
pub fn pages_dir(root: &Path, config: &AutofixConfig) -> String {
    if let Some(dir) = &config.pages_dir {
        return dir.trim_end_matches('/').to_string();
    }
    PAGE_DIR_CANDIDATES
        .iter()
        .find(|d| root.join(d).is_dir())
        .or(PAGE_DIR_CANDIDATES.last())
        .map_or_else(String::new, |d| (*d).to_string())
}

/// `/help/faq` becomes `HelpFaq`. Names that would start with a digit get a `Page` prefix.
#[must_use]
pub fn stub_component(route: &str) -> Option<String> {
    let name: String = segments(route).iter().map(|s| pascal_case(s)).collect();
    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(format!("Page{name}"));
    }
    Some(name)
}

#[must_use]
pub fn plan_stub(pages_dir: &str, route: &str) -> Option<StubPage> {
    let component = stub_component(route)?;
    Some(StubPage {
        file: format!("{pages_dir}/{component}.tsx"),
        component,
        route: route.to_string(),
    })
}

#[must_use]
pub fn stub_content(page: &StubPage) -> String {
    format!(
        "// Placeholder for {route}\n\
         export default function {name}() {{\n\
         {INDENT}return (\n\
         {INDENT}{INDENT}<div>\n\
         {INDENT}{INDENT}{INDENT}<h1>{name}</h1>\n\
         {INDENT}{INDENT}{INDENT}<p>This page is under construction.</p>\n\
         {INDENT}{INDENT}</div>\n\
         {INDENT});\n\
         }}\n",
        route = page.route,
        name = page.component,
    )
}

/// Inserts route lines and default imports for `entries` into a routing file.
///
/// Entries whose pattern or component the file already routes are skipped.
/// Returns `None` when the file has no fallback route and no closing
/// `</Switch>`/`</Routes>` to insert before.
#[must_use]
pub fn insert_routes(routing_file: &str, text: &str, entries: &[RouteEntry]) -> Option<(String, Vec<RouteEntry>)> {
    let tags = route_tags(text);
    let mut added: Vec<RouteEntry> = Vec::new();
    for entry in entries {
        let routed = tags.iter().any(|t| {
            t.path.as_deref() == Some(entry.pattern.as_str())
                || t.component.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(&entry.component))
        });
        let queued = added
            .iter()
            .any(|a| a.pattern == entry.pattern || a.component == entry.component);
        if !routed && !queued {
            added.push(entry.clone());
        }
    }
    if added.is_empty() {
        return Some((text.to_string(), added));
    }

    let (at, indent) = insertion_point(text, &tags)?;
    let element_style = tags.iter().any(|t| text[t.start..t.end].contains("element="));
    let routes: String = added
        .iter()
        .map(|e| {
            if element_style {
                format!("{indent}<Route path=\"{}\" element={{<{} />}} />\n", e.pattern, e.component)
            } else {
                format!("{indent}<Route path=\"{}\" component={{{}}} />\n", e.pattern, e.component)
            }
        })
        .collect();
    let imports: String = added
        .iter()
        .filter(|e| !imports_name(text, &e.component))
        .map(|e| format!("import {} from \"{}\";\n", e.component, import_path(routing_file, &e.page_file)))
        .collect();

    let mut edits = vec![Edit {
        start: at,
        end: at,
        replacement: routes,
        change: 0,
    }];
    if !imports.is_empty() {
        let pos = import_end(text);
        let replacement = if text[..pos].ends_with('\n') || pos == 0 {
            imports
        } else {
            format!("\n{imports}")
        };
        edits.push(Edit {
            start: pos,
            end: pos,
            replacement,
            change: 0,
        });
    }
    edits.sort_by_key(|e| e.start);
    Some((splice(text, &edits), added))
}

/// Line start and indentation for new route lines.
fn insertion_point(text: &str, tags: &[RouteTag]) -> Option<(usize, String)> {
    if let Some(fallback) = tags.iter().find(|t| t.path.is_none()) {
        let start = line_start(text, fallback.start);
        return Some((start, leading_ws(&text[start..])));
    }
    let close = CLOSING_TAGS.iter().filter_map(|tag| text.rfind(tag)).max()?;
    let start = line_start(text, close);
    let indent = leading_ws(&text[start..]);
    if start + indent.len() < close {
        // Closing tag shares its line with other markup.
        return Some((close, String::new()));
    }
    Some((start, format!("{indent}{INDENT}")))
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn leading_ws(line: &str) -> String {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').collect()
}

/// Byte offset just past the last import statement, or 0.
fn import_end(text: &str) -> usize {
    let mut offset = 0;
    let mut end = 0;
    let mut open = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("import ") || trimmed.starts_with("import{") {
            open = true;
        }
        offset += line.len();
        if open && (trimmed.ends_with(';') || trimmed.contains(" from ") || trimmed.starts_with("} from")) {
            open = false;
            end = offset;
        }
    }
    end
}

fn imports_name(text: &str, name: &str) -> bool {
    text.lines()
        .filter(|l| l.trim_start().starts_with("import"))
        .any(|l| contains_word(l, name))
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    haystack.match_indices(word).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Relative module path from the routing file to a page, without extension.
#[must_use]
pub fn import_path(routing_file: &str, page_file: &str) -> String {
    let from: Vec<&str> = routing_file.split('/').collect();
    let from_dir = &from[..from.len().saturating_sub(1)];
    let page = page_file
        .rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .map_or(page_file, |(stem, _)| stem);
    let to: Vec<&str> = page.split('/').collect();

    let common = from_dir.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let ups = from_dir.len() - common;
    let rest = to[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}
