// src/discovery.rs
use crate::config::ScanConfig;
use crate::error::Result;
use crate::types::{LanguageClass, SourceFile, SourceSet};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

struct Selectors {
    pages: GlobSet,
    frontend: GlobSet,
    backend: GlobSet,
    schema: GlobSet,
}

impl Selectors {
    fn new(scan: &ScanConfig) -> Result<Self> {
        Ok(Self {
            pages: build_set(&scan.page_globs)?,
            frontend: build_set(&scan.frontend_globs)?,
            backend: build_set(&scan.backend_globs)?,
            schema: build_set(&scan.schema_globs)?,
        })
    }

    fn classify(&self, rel: &str, text: String) -> Option<SourceFile> {
        let mut file = SourceFile::new(rel, text);
        if self.frontend.is_match(rel) {
            file = file.with_class(LanguageClass::Frontend);
        }
        if self.backend.is_match(rel) {
            file = file.with_class(LanguageClass::Backend);
        }
        if self.schema.is_match(rel) {
            file = file.with_class(LanguageClass::Schema);
        }
        if self.pages.is_match(rel) {
            file = file.as_page();
        }
        (!file.classes.is_empty()).then_some(file)
    }
}

fn build_set(globs: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for g in globs {
        builder.add(Glob::new(g)?);
    }
    Ok(builder.build()?)
}

/// Loads every file under `root` selected by the configured glob sets.
///
/// Skip directories are pruned during the walk. Files that are not valid
/// UTF-8 or cannot be read are skipped.
///
/// # Errors
/// Returns error if a configured glob is invalid.
pub fn load_sources(root: &Path, scan: &ScanConfig) -> Result<SourceSet> {
    let selectors = Selectors::new(scan)?;
    let mut files = Vec::new();
    let mut skipped = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_prune(e, &scan.skip_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "walk error");
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative(root, entry.path()) else {
            continue;
        };
        if !selectors.selects(&rel) {
            continue;
        }
        match fs::read(entry.path()).map(String::from_utf8) {
            Ok(Ok(text)) => files.extend(selectors.classify(&rel, text)),
            Ok(Err(_)) => {
                debug!(path = %rel, "skipping file that is not valid UTF-8");
                skipped += 1;
            }
            Err(e) => {
                debug!(path = %rel, error = %e, "skipping unreadable file");
                skipped += 1;
            }
        }
    }

    debug!(loaded = files.len(), skipped, "source set loaded");
    Ok(SourceSet::new(files))
}

impl Selectors {
    fn selects(&self, rel: &str) -> bool {
        self.frontend.is_match(rel)
            || self.backend.is_match(rel)
            || self.schema.is_match(rel)
            || self.pages.is_match(rel)
    }
}

fn should_prune(entry: &walkdir::DirEntry, skip_dirs: &[String]) -> bool {
    entry.file_type().is_dir() && {
        let name = entry.file_name().to_string_lossy();
        skip_dirs.iter().any(|s| *s == name)
    }
}

/// Slash-separated path of `path` relative to `root`.
#[must_use]
pub fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_classification_and_pruning() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("client/src/pages"))?;
        fs::create_dir_all(root.join("server"))?;
        fs::create_dir_all(root.join("client/src/node_modules/x"))?;
        fs::write(root.join("client/src/pages/Home.tsx"), "export default function Home() {}")?;
        fs::write(root.join("server/routers.ts"), "export const appRouter = router({});")?;
        fs::write(root.join("client/src/node_modules/x/index.ts"), "ignored")?;
        fs::write(root.join("client/src/bad.ts"), [0xff, 0xfe, 0x00])?;
        fs::write(root.join("README.md"), "# not code")?;

        let set = load_sources(root, &ScanConfig::default())?;
        let paths: Vec<&str> = set.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["client/src/pages/Home.tsx", "server/routers.ts"]);

        let home = set.get("client/src/pages/Home.tsx").ok_or("missing page")?;
        assert!(home.page);
        assert!(home.is(LanguageClass::Frontend));
        assert!(set.files[1].is(LanguageClass::Backend));
        Ok(())
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let scan = ScanConfig {
            page_globs: vec!["src/[".to_string()],
            ..ScanConfig::default()
        };
        let dir = tempdir().ok();
        let root = dir.as_ref().map_or(Path::new("."), |d| d.path());
        assert!(load_sources(root, &scan).is_err());
    }
}
