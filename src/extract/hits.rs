//! Raw lexical findings that become issues without cross-referencing.

use super::LineIndex;
use crate::config::Config;
use crate::types::{HitKind, LanguageClass, PatternHit, SourceFile};
use regex::Regex;
use std::sync::LazyLock;

const SNIPPET_MAX: usize = 120;

macro_rules! rule {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| {
            Regex::new($pattern)
                .map_err(|e| tracing::warn!(rule = stringify!($name), error = %e, "dropping rule"))
                .ok()
        });
    };
}

rule!(SECRET, r#"(?i)(?:api_?key|secret|password|token)\s*[:=]\s*["'](?P<v>[\w\-.]{10,})["']"#);
rule!(OPEN_REDIRECT, r"(?i)(?:\bredirect\s*\([^)\n]*\bnext\b|location\.href\s*=\s*[^;\n]*\bnext\b)");
rule!(AUTH_BYPASS, r#"(?i)["'](?P<v>/api/auth/(?P<provider>google|apple|github|facebook)[^"']*)["']"#);
rule!(LOCALHOST, r"\b(?:localhost|127\.0\.0\.1)\b|:(?:3001|5173|4000|8080)\b");
rule!(API_URL, r#"\b(?:fetch|axios\.(?:get|post|put|patch|delete))\s*\(\s*["'](?P<v>https?://[^"']+)["']"#);
rule!(TODO, r"(?i)//\s*(?:TODO|FIXME|HACK|XXX|BUG)\b");
rule!(CONSOLE_LOG, r"\bconsole\.log\s*\(");

/// A direct auth-provider literal and the provider it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthLiteral {
    pub start: usize,
    pub end: usize,
    pub provider: String,
}

/// Direct `/api/auth/<provider>` literals in `text`.
#[must_use]
pub fn auth_literals(text: &str) -> Vec<AuthLiteral> {
    let Some(re) = AUTH_BYPASS.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|c| {
            let v = c.name("v")?;
            Some(AuthLiteral {
                start: v.start(),
                end: v.end(),
                provider: c.name("provider")?.as_str().to_ascii_lowercase(),
            })
        })
        .collect()
}

#[must_use]
pub fn extract(file: &SourceFile, config: &Config) -> Vec<PatternHit> {
    let text = file.text.as_str();
    let lines = LineIndex::new(text);
    let mut out = Vec::new();
    let mut hit = |kind, offset: usize, snippet: String| {
        out.push(PatternHit {
            kind,
            file: file.path.clone(),
            line: if offset == usize::MAX { 0 } else { lines.line(offset) },
            snippet,
        });
    };

    if let Some(re) = SECRET.as_ref() {
        for c in re.captures_iter(text) {
            if let (Some(all), Some(v)) = (c.get(0), c.name("v")) {
                let masked = all.as_str().replace(v.as_str(), &mask(v.as_str()));
                hit(HitKind::HardcodedSecret, all.start(), masked);
            }
        }
    }
    for (kind, re) in [(HitKind::OpenRedirect, &*OPEN_REDIRECT), (HitKind::TodoMarker, &*TODO)] {
        if let Some(re) = re.as_ref() {
            for m in re.find_iter(text) {
                hit(kind, m.start(), line_snippet(text, m.start()));
            }
        }
    }
    if file.is(LanguageClass::Frontend) {
        if let Some(re) = AUTH_BYPASS.as_ref() {
            for c in re.captures_iter(text) {
                if let Some(v) = c.name("v") {
                    hit(HitKind::AuthBypassLink, v.start(), v.as_str().to_string());
                }
            }
        }
    }
    if let Some(re) = LOCALHOST.as_ref() {
        let mut last_line = 0;
        for m in re.find_iter(text) {
            let line = lines.line(m.start());
            if line != last_line {
                last_line = line;
                hit(HitKind::HardcodedLocalhost, m.start(), line_snippet(text, m.start()));
            }
        }
    }
    if let Some(re) = API_URL.as_ref() {
        for c in re.captures_iter(text) {
            let Some(v) = c.name("v") else { continue };
            let host = url_host(v.as_str());
            if is_local(host) || is_allowed(host, &config.scan.allowed_api_hosts) {
                continue;
            }
            hit(HitKind::HardcodedApiUrl, v.start(), v.as_str().to_string());
        }
    }
    if let Some(re) = CONSOLE_LOG.as_ref() {
        let count = re.find_iter(text).count();
        if count > config.rules.console_log_limit {
            hit(HitKind::ExcessDebugLog, usize::MAX, format!("{count} console.log calls"));
        }
    }
    out
}

fn mask(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    format!("{head}****")
}

fn line_snippet(text: &str, offset: usize) -> String {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    text[start..end].trim().chars().take(SNIPPET_MAX).collect()
}

fn url_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let end = rest.find(['/', ':', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

fn is_local(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1")
}

fn is_allowed(host: &str, allowed: &[String]) -> bool {
    allowed
        .iter()
        .any(|a| host == a || host.strip_suffix(a.as_str()).is_some_and(|p| p.ends_with('.')))
}
