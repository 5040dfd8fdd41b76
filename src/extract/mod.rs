//! Lexical extractors: pure `text -> facts` functions driven by named rule tables.
//!
//! Each recognized spelling of a construct is one [`Rule`]. Adding a spelling
//! means adding a row to the relevant table; graph building never changes.

pub mod hits;
pub mod links;
pub mod routes;
pub mod rpc;
pub mod schema;

use crate::config::Config;
use crate::types::{FactSet, LanguageClass, SourceSet};
use regex::Regex;
use tracing::{debug, warn};

/// A named lexical pattern. The value of interest is the capture group `v`.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: &'static str,
}

impl Rule {
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self { name, pattern }
    }
}

/// Compiled rules. Rules whose pattern fails to compile are dropped.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<(&'static str, Regex)>,
}

impl RuleTable {
    #[must_use]
    pub fn compile(rules: &[Rule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|r| match Regex::new(r.pattern) {
                Ok(re) => Some((r.name, re)),
                Err(e) => {
                    warn!(rule = r.name, error = %e, "dropping extraction rule");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Regex)> {
        self.rules.iter().map(|(n, re)| (*n, re))
    }

    /// First rule (in table order) whose `v` group matches `text`.
    #[must_use]
    pub fn first_value<'t>(&self, text: &'t str) -> Option<(&'static str, regex::Match<'t>)> {
        self.iter()
            .find_map(|(name, re)| re.captures(text).and_then(|c| c.name("v")).map(|m| (name, m)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Byte offset to 1-based line lookup.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    #[must_use]
    pub fn line(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// Runs every extractor over the source set and merges the facts.
///
/// The merge sorts and deduplicates, so file order never changes the result.
#[must_use]
pub fn extract_all(sources: &SourceSet, config: &Config) -> FactSet {
    let mut facts = FactSet::default();
    let mounts = rpc::collect_mounts(sources.of_class(LanguageClass::Backend));

    for file in &sources.files {
        if file.is(LanguageClass::Frontend) {
            facts.routes.extend(routes::extract(file));
            facts
                .links
                .extend(links::extract(file, &config.scan.ignored_link_prefixes));
            facts.usages.extend(rpc::extract_usages(file));
        }
        if file.is(LanguageClass::Backend) {
            facts.procedures.extend(rpc::extract_procedures(file, &mounts));
        }
        if file.is(LanguageClass::Schema) || file.is(LanguageClass::Backend) {
            facts.tables.extend(schema::extract(file));
        }
        facts.hits.extend(hits::extract(file, config));
    }

    dedup(&mut facts);
    debug!(
        routes = facts.routes.len(),
        links = facts.links.len(),
        procedures = facts.procedures.len(),
        usages = facts.usages.len(),
        "extraction complete"
    );
    facts
}

fn dedup(facts: &mut FactSet) {
    facts.routes.sort();
    facts
        .routes
        .dedup_by(|a, b| a.pattern == b.pattern && a.component == b.component);

    facts.links.sort();
    facts
        .links
        .dedup_by(|a, b| a.file == b.file && a.line == b.line && a.target == b.target);

    facts.procedures.sort();
    facts
        .procedures
        .dedup_by(|a, b| a.namespace == b.namespace && a.name == b.name && a.access == b.access);

    facts.usages.sort_by(|a, b| {
        (&a.namespace, &a.name, a.kind, &a.file, a.line)
            .cmp(&(&b.namespace, &b.name, b.kind, &b.file, b.line))
    });
    facts.usages.dedup_by(|a, b| {
        a.namespace == b.namespace && a.name == b.name && a.kind == b.kind && a.file == b.file
    });

    facts.tables.sort();
    facts.tables.dedup_by(|a, b| a.variable == b.variable && a.table == b.table);

    facts.hits.sort();
    facts.hits.dedup();
}
