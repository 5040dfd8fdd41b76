use crate::types::{SchemaTable, SourceFile};
use regex::Regex;
use std::sync::LazyLock;

static TABLE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"export\s+const\s+(?P<var>[A-Za-z_]\w*)\s*=\s*(?:mysqlTable|pgTable|sqliteTable|table)\s*\(\s*["'](?P<table>[^"']+)["']"#,
    )
    .ok()
});

/// Drizzle-style table declarations.
#[must_use]
pub fn extract(file: &SourceFile) -> Vec<SchemaTable> {
    let Some(re) = TABLE_RE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(&file.text)
        .filter_map(|caps| {
            Some(SchemaTable {
                variable: caps.name("var")?.as_str().to_string(),
                table: caps.name("table")?.as_str().to_string(),
                file: file.path.clone(),
            })
        })
        .collect()
}
