//! Common data structures shared by the extract, analysis and fix phases.

mod facts;
mod issue;

pub use facts::{
    AccessKind, FactSet, HitKind, LinkKind, LinkReference, PatternHit, RouteDeclaration,
    RpcMethodKind, RpcProcedure, RpcUsage, SchemaTable,
};
pub use issue::{Category, Issue, Severity};

use serde::Serialize;
use std::collections::BTreeSet;

/// Coarse access zone of a route or link, derived from path prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    Public,
    Auth,
    Admin,
}

/// Which glob set selected a file. A file may belong to several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageClass {
    Frontend,
    Backend,
    Schema,
}

/// A decoded source file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Slash-separated path relative to the scanned root.
    pub path: String,
    pub text: String,
    pub classes: BTreeSet<LanguageClass>,
    /// Selected by the page globs.
    pub page: bool,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            classes: BTreeSet::new(),
            page: false,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: LanguageClass) -> Self {
        self.classes.insert(class);
        self
    }

    #[must_use]
    pub fn as_page(mut self) -> Self {
        self.page = true;
        self.classes.insert(LanguageClass::Frontend);
        self
    }

    #[must_use]
    pub fn is(&self, class: LanguageClass) -> bool {
        self.classes.contains(&class)
    }

    /// File name without directories or extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.split('.').next().unwrap_or(name)
    }
}

/// Every loaded file, ordered by path.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub files: Vec<SourceFile>,
}

impl SourceSet {
    #[must_use]
    pub fn new(mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        Self { files }
    }

    pub fn of_class(&self, class: LanguageClass) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(move |f| f.is(class))
    }

    pub fn pages(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.page)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&SourceFile> {
        self.files
            .binary_search_by(|f| f.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.files[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
