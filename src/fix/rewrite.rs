//! Scoped span replacement. Only the matched literal bytes are rewritten.

use crate::extract::hits::auth_literals;
use crate::extract::links::spans;

/// What kind of literal a text change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    LinkTarget,
    AuthLiteral,
}

/// One byte range to replace, tagged with the change that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    pub change: usize,
}

/// Locates every literal equal to `old` and plans its replacement with `new`.
///
/// `changes` holds `(kind, old, new)`; `Edit::change` indexes into it.
/// Overlapping spans keep the earliest.
#[must_use]
pub fn plan_edits(text: &str, changes: &[(LiteralKind, String, String)]) -> Vec<Edit> {
    let link_spans = spans(text);
    let auth_spans = auth_literals(text);
    let mut edits = Vec::new();

    for (idx, (kind, old, new)) in changes.iter().enumerate() {
        let ranges: Vec<(usize, usize)> = match kind {
            LiteralKind::LinkTarget => link_spans
                .iter()
                .filter(|s| s.target == *old)
                .map(|s| (s.start, s.end))
                .collect(),
            LiteralKind::AuthLiteral => auth_spans
                .iter()
                .filter(|a| text[a.start..a.end] == *old)
                .map(|a| (a.start, a.end))
                .collect(),
        };
        edits.extend(ranges.into_iter().map(|(start, end)| Edit {
            start,
            end,
            replacement: new.clone(),
            change: idx,
        }));
    }

    edits.sort_by_key(|e| (e.start, e.end));
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if kept.last().is_some_and(|last| edit.start < last.end) {
            continue;
        }
        kept.push(edit);
    }
    kept
}

/// Applies sorted, non-overlapping edits.
#[must_use]
pub fn splice<'a, I>(text: &str, edits: I) -> String
where
    I: IntoIterator<Item = &'a Edit>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);
    out
}
