//! Autofix engine: proposes minimal rewrites and, when authorized, applies
//! them behind a per-run backup.
//!
//! Every write in one invocation goes through a single [`AutofixEngine`],
//! which owns the run's [`BackupRun`]. A pre-image is on disk before the
//! file it belongs to is touched.

pub mod backup;
pub mod diff;
pub mod gateway;
pub mod propose;
pub mod rewrite;
pub mod stub;

use self::backup::{cleanup_old_backups, BackupRun};
use self::diff::unified_diff;
use self::gateway::gateway_changes;
use self::propose::{propose_canonical, propose_link, stub_eligible, Proposal, DISABLED_TARGET};
use self::rewrite::{plan_edits, splice, LiteralKind};
use self::stub::{insert_routes, pages_dir, plan_stub, stub_content, RouteEntry, StubPage};
use crate::config::Config;
use crate::error::{NavWardenError, Result};
use crate::report::Report;
use crate::types::Category;
use crate::xref::Repair;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixClass {
    Links,
    DisableUnfixable,
    LoginGateway,
    StubPages,
    AddRoutes,
}

impl FixClass {
    pub const ALL: [Self; 5] = [
        Self::Links,
        Self::DisableUnfixable,
        Self::LoginGateway,
        Self::StubPages,
        Self::AddRoutes,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::DisableUnfixable => "disable-unfixable",
            Self::LoginGateway => "login-gateway",
            Self::StubPages => "stub-pages",
            Self::AddRoutes => "add-routes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixStatus {
    /// Dry run: computed, not written.
    Planned,
    Applied,
    Failed,
}

/// The issue a fix resolves, keyed the way [`crate::types::Issue::subject`] is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IssueRef {
    pub file: String,
    pub subject: String,
}

impl IssueRef {
    fn new(file: &str, subject: &str) -> Self {
        Self {
            file: file.to_string(),
            subject: subject.to_string(),
        }
    }
}

/// One reviewable change to one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub kind: FixClass,
    pub file: String,
    pub before: String,
    pub after: String,
    pub note: String,
    pub diff: String,
    /// Literal spans rewritten by this fix.
    pub occurrences: usize,
    pub status: FixStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub resolves: Vec<IssueRef>,
}

#[derive(Debug, Clone)]
pub struct AutofixOutcome {
    pub fixes: Vec<Fix>,
    /// Run directory holding this invocation's pre-images, if anything was written.
    pub backup_dir: Option<PathBuf>,
}

impl AutofixOutcome {
    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(FixStatus::Applied)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(FixStatus::Failed)
    }

    fn count(&self, status: FixStatus) -> usize {
        self.fixes.iter().filter(|f| f.status == status).count()
    }
}

/// Proposes fixes for `classes` and applies them when `apply` is set.
///
/// # Errors
/// Does not fail on write errors; those become `Failed` fixes. Reserved
/// for failures outside any single fix.
pub fn autofix(
    root: &Path,
    report: &Report,
    classes: &[FixClass],
    apply: bool,
    config: &Config,
) -> Result<AutofixOutcome> {
    AutofixEngine::new(root, config, apply).run(report, classes)
}

/// A literal replacement planned for one file.
#[derive(Debug, Clone)]
struct Change {
    class: FixClass,
    literal: LiteralKind,
    old: String,
    new: String,
    note: String,
    resolves: Vec<IssueRef>,
}

/// Explicit context for one autofix invocation.
pub struct AutofixEngine<'a> {
    root: PathBuf,
    config: &'a Config,
    apply: bool,
    backup: Option<BackupRun>,
    fixes: Vec<Fix>,
}

impl<'a> AutofixEngine<'a> {
    #[must_use]
    pub fn new(root: &Path, config: &'a Config, apply: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            apply,
            backup: None,
            fixes: Vec::new(),
        }
    }

    /// Runs every requested class in a fixed order: literal rewrites,
    /// stub pages, then route registration.
    ///
    /// # Errors
    /// See [`autofix`].
    pub fn run(mut self, report: &Report, classes: &[FixClass]) -> Result<AutofixOutcome> {
        let classes: BTreeSet<FixClass> = classes.iter().copied().collect();
        if classes.contains(&FixClass::DisableUnfixable) && !classes.contains(&FixClass::Links) {
            warn!("disable-unfixable requires the links class; skipping it");
        }

        let stubs = if classes.contains(&FixClass::StubPages) {
            self.plan_stubs(report)
        } else {
            Vec::new()
        };

        let mut per_file = literal_changes(report, &classes);
        let gateway_files: BTreeSet<&str> = if classes.contains(&FixClass::LoginGateway) {
            report
                .issues
                .iter()
                .filter(|i| i.category == Category::Auth && i.fix_available)
                .map(|i| i.file.as_str())
                .collect()
        } else {
            BTreeSet::new()
        };
        for file in &gateway_files {
            per_file.entry((*file).to_string()).or_default();
        }
        for (file, changes) in per_file {
            self.rewrite_file(&file, changes, gateway_files.contains(file.as_str()));
        }

        for page in &stubs {
            self.create_stub(page);
        }
        if classes.contains(&FixClass::AddRoutes) {
            self.register_routes(report, &stubs);
        }

        if self.apply {
            if let Some(run) = &self.backup {
                cleanup_old_backups(
                    &self.root,
                    &self.config.autofix.backup_dir,
                    self.config.autofix.backup_retention,
                );
                debug!(dir = %run.dir().display(), "backup run complete");
            }
        }
        let outcome = AutofixOutcome {
            backup_dir: self.backup.as_ref().map(|b| b.dir().to_path_buf()),
            fixes: self.fixes,
        };
        info!(
            fixes = outcome.fixes.len(),
            applied = outcome.applied(),
            failed = outcome.failed(),
            "autofix complete"
        );
        Ok(outcome)
    }

    fn rewrite_file(&mut self, rel: &str, changes: Vec<Change>, gateway: bool) {
        let path = self.root.join(rel);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                let error = NavWardenError::io(e, &path).to_string();
                warn!(file = rel, error = %error, "cannot read file for rewrite");
                for change in changes {
                    self.fixes.push(literal_fix(rel, change, String::new(), 0, FixStatus::Failed, Some(error.clone())));
                }
                return;
            }
        };
        self.rewrite_text(rel, &text, changes, gateway);
    }

    /// Plans and, when applying, writes the rewrites of `rel` whose current
    /// content is `text`.
    fn rewrite_text(&mut self, rel: &str, text: &str, mut changes: Vec<Change>, gateway: bool) {
        if gateway {
            changes.extend(gateway_changes(text).into_iter().map(|(old, new)| Change {
                class: FixClass::LoginGateway,
                literal: LiteralKind::AuthLiteral,
                note: format!("`{old}` -> `{new}`"),
                resolves: vec![IssueRef::new(rel, &old)],
                old,
                new,
            }));
        }

        let keys: Vec<(LiteralKind, String, String)> = changes
            .iter()
            .map(|c| (c.literal, c.old.clone(), c.new.clone()))
            .collect();
        let edits = plan_edits(text, &keys);
        if edits.is_empty() {
            debug!(file = rel, "nothing left to rewrite");
            return;
        }
        let new_text = splice(text, &edits);

        let mut planned: Vec<Fix> = Vec::new();
        for (idx, change) in changes.into_iter().enumerate() {
            let own: Vec<_> = edits.iter().filter(|e| e.change == idx).collect();
            if own.is_empty() {
                continue;
            }
            let diff = unified_diff(rel, text, &splice(text, own.iter().copied()));
            planned.push(literal_fix(rel, change, diff, own.len(), FixStatus::Planned, None));
        }

        let result = if self.apply {
            self.write_with_backup(rel, text, &new_text)
        } else {
            Ok(())
        };
        self.settle(planned, result);
    }

    fn plan_stubs(&self, report: &Report) -> Vec<StubPage> {
        let dir = pages_dir(&self.root, &self.config.autofix);
        let mut seen = BTreeSet::new();
        report
            .broken_links
            .iter()
            .filter(|b| stub_eligible(b))
            .filter_map(|b| plan_stub(&dir, &b.normalized))
            .filter(|p| seen.insert(p.file.clone()))
            .filter(|p| !self.root.join(&p.file).exists())
            .collect()
    }

    fn create_stub(&mut self, page: &StubPage) {
        let content = stub_content(page);
        let fix = Fix {
            kind: FixClass::StubPages,
            file: page.file.clone(),
            before: String::new(),
            after: content.clone(),
            note: format!("created {} for {}", page.component, page.route),
            diff: unified_diff(&page.file, "", &content),
            occurrences: 1,
            status: FixStatus::Planned,
            error: None,
            resolves: Vec::new(),
        };
        let result = if self.apply {
            self.create_with_record(&page.file, &content)
        } else {
            Ok(())
        };
        self.settle(vec![fix], result);
    }

    fn register_routes(&mut self, report: &Report, stubs: &[StubPage]) {
        let Some(routing) = report.routing_file.clone() else {
            warn!("no routing file identified; skipping add-routes");
            return;
        };
        let declared: BTreeSet<&str> = report.routes.iter().map(|r| r.pattern.as_str()).collect();
        let mut entries: Vec<(RouteEntry, Vec<IssueRef>)> = Vec::new();
        for o in &report.orphan_pages {
            entries.push((
                RouteEntry {
                    pattern: o.suggested_route.clone(),
                    component: o.component.clone(),
                    page_file: o.file.clone(),
                },
                vec![IssueRef::new(&o.file, &o.component)],
            ));
        }
        for page in stubs {
            let resolves = report
                .broken_links
                .iter()
                .filter(|b| b.normalized == page.route)
                .map(|b| IssueRef::new(&b.link.file, &b.link.target))
                .collect();
            entries.push((
                RouteEntry {
                    pattern: page.route.clone(),
                    component: page.component.clone(),
                    page_file: page.file.clone(),
                },
                resolves,
            ));
        }
        entries.retain(|(e, _)| !declared.contains(e.pattern.as_str()));
        if entries.is_empty() {
            return;
        }

        let path = self.root.join(&routing);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                let error = NavWardenError::io(e, &path).to_string();
                self.fixes.push(route_fix(&routing, "", Vec::new(), String::new(), FixStatus::Failed, Some(error)));
                return;
            }
        };
        let wanted: Vec<RouteEntry> = entries.iter().map(|(e, _)| e.clone()).collect();
        let Some((new_text, added)) = insert_routes(&routing, &text, &wanted) else {
            let error = "no fallback route or closing </Switch>/</Routes> to insert before".to_string();
            self.fixes.push(route_fix(&routing, "", Vec::new(), String::new(), FixStatus::Failed, Some(error)));
            return;
        };
        if added.is_empty() {
            return;
        }

        let resolves: Vec<IssueRef> = entries
            .into_iter()
            .filter(|(e, _)| added.contains(e))
            .flat_map(|(_, r)| r)
            .collect();
        let patterns: Vec<&str> = added.iter().map(|a| a.pattern.as_str()).collect();
        let mut fix = route_fix(
            &routing,
            &patterns.join(", "),
            resolves,
            unified_diff(&routing, &text, &new_text),
            FixStatus::Planned,
            None,
        );
        fix.occurrences = added.len();
        let result = if self.apply {
            self.write_with_backup(&routing, &text, &new_text)
        } else {
            Ok(())
        };
        self.settle(vec![fix], result);
    }

    /// Backs up `pre_image` under the run directory, then writes `new_text`.
    fn write_with_backup(&mut self, rel: &str, pre_image: &str, new_text: &str) -> Result<()> {
        self.backup_run()?.backup(rel, pre_image)?;
        let path = self.root.join(rel);
        fs::write(&path, new_text).map_err(|e| NavWardenError::io(e, &path))
    }

    /// Records `rel` as created in the manifest, then writes it.
    fn create_with_record(&mut self, rel: &str, content: &str) -> Result<()> {
        self.backup_run()?.record_created(rel)?;
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| NavWardenError::io(e, parent))?;
        }
        fs::write(&path, content).map_err(|e| NavWardenError::io(e, &path))
    }

    fn backup_run(&mut self) -> Result<&mut BackupRun> {
        if self.backup.is_none() {
            self.backup = Some(BackupRun::create(&self.root, &self.config.autofix.backup_dir)?);
        }
        self.backup
            .as_mut()
            .ok_or_else(|| NavWardenError::Backup("backup run unavailable".to_string()))
    }

    fn settle(&mut self, mut fixes: Vec<Fix>, result: Result<()>) {
        let (status, error) = match (&result, self.apply) {
            (Err(e), _) => (FixStatus::Failed, Some(e.to_string())),
            (Ok(()), true) => (FixStatus::Applied, None),
            (Ok(()), false) => (FixStatus::Planned, None),
        };
        if let Some(err) = &error {
            warn!(error = %err, "fix failed");
        }
        for fix in &mut fixes {
            fix.status = status;
            fix.error.clone_from(&error);
        }
        self.fixes.extend(fixes);
    }
}

/// Link and canonical rewrites grouped by file, one change per distinct old literal.
fn literal_changes(report: &Report, classes: &BTreeSet<FixClass>) -> BTreeMap<String, Vec<Change>> {
    let mut per_file: BTreeMap<String, Vec<Change>> = BTreeMap::new();
    if !classes.contains(&FixClass::Links) {
        return per_file;
    }
    let disable = classes.contains(&FixClass::DisableUnfixable);
    let stubbing = classes.contains(&FixClass::StubPages);

    let mut add = |file: &str, class: FixClass, old: &str, new: String, note: String| {
        let changes = per_file.entry(file.to_string()).or_default();
        let resolves = IssueRef::new(file, old);
        match changes.iter_mut().find(|c| c.old == old) {
            Some(existing) => existing.resolves.push(resolves),
            None => changes.push(Change {
                class,
                literal: LiteralKind::LinkTarget,
                old: old.to_string(),
                new,
                note,
                resolves: vec![resolves],
            }),
        }
    };

    for b in &report.broken_links {
        let old = b.link.target.as_str();
        match propose_link(b) {
            Proposal::Replace(new) => {
                let note = format!("`{old}` -> `{new}` ({})", repair_label(b.repair));
                add(&b.link.file, FixClass::Links, old, new, note);
            }
            Proposal::Unfixable if disable && !(stubbing && stub_eligible(b)) => {
                let note = format!("`{old}` disabled: no confident repair");
                add(&b.link.file, FixClass::DisableUnfixable, old, DISABLED_TARGET.to_string(), note);
            }
            Proposal::Unfixable => {}
        }
    }
    for n in &report.non_canonical_links {
        if let Proposal::Replace(new) = propose_canonical(n) {
            let old = n.link.target.as_str();
            let note = format!("`{old}` -> `{new}` (trailing slash)");
            add(&n.link.file, FixClass::Links, old, new, note);
        }
    }
    per_file
}

fn repair_label(repair: Option<Repair>) -> &'static str {
    match repair {
        Some(Repair::CaseCorrection) => "case correction",
        Some(Repair::CloseMatch) | None => "close match",
    }
}

fn literal_fix(
    file: &str,
    change: Change,
    diff: String,
    occurrences: usize,
    status: FixStatus,
    error: Option<String>,
) -> Fix {
    Fix {
        kind: change.class,
        file: file.to_string(),
        before: change.old,
        after: change.new,
        note: change.note,
        diff,
        occurrences,
        status,
        error,
        resolves: change.resolves,
    }
}

fn route_fix(
    file: &str,
    patterns: &str,
    resolves: Vec<IssueRef>,
    diff: String,
    status: FixStatus,
    error: Option<String>,
) -> Fix {
    Fix {
        kind: FixClass::AddRoutes,
        file: file.to_string(),
        before: String::new(),
        after: patterns.to_string(),
        note: if patterns.is_empty() {
            "route registration".to_string()
        } else {
            format!("registered {patterns}")
        },
        diff,
        occurrences: 0,
        status,
        error,
        resolves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::analyze;
    use crate::types::{LanguageClass, SourceFile, SourceSet};
    use tempfile::tempdir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const APP: &str = r#"<Switch>
  <Route path="/" component={Home} />
  <Route path="/courses" component={Courses} />
</Switch>
"#;

    fn write_tree(root: &Path, files: &[(&str, &str)]) -> std::io::Result<SourceSet> {
        let mut set = Vec::new();
        for (rel, text) in files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, text)?;
            set.push(SourceFile::new(*rel, *text).with_class(LanguageClass::Frontend));
        }
        Ok(SourceSet::new(set))
    }

    #[test]
    fn test_dry_run_writes_nothing() -> TestResult {
        let dir = tempdir()?;
        let nav = r#"<Link href="/Courses">C</Link>"#;
        let set = write_tree(dir.path(), &[("client/src/App.tsx", APP), ("client/src/Nav.tsx", nav)])?;
        let config = Config::default();
        let report = analyze(&set, &config);

        let outcome = autofix(dir.path(), &report, &[FixClass::Links], false, &config)?;
        assert_eq!(outcome.fixes.len(), 1);
        assert_eq!(outcome.fixes[0].status, FixStatus::Planned);
        assert!(outcome.backup_dir.is_none());
        assert_eq!(fs::read_to_string(dir.path().join("client/src/Nav.tsx"))?, nav);
        Ok(())
    }

    #[test]
    fn test_disable_unfixable_needs_links() -> TestResult {
        let dir = tempdir()?;
        let nav = r#"<Link href="/nowhere">x</Link>"#;
        let set = write_tree(dir.path(), &[("client/src/App.tsx", APP), ("client/src/Nav.tsx", nav)])?;
        let config = Config::default();
        let report = analyze(&set, &config);

        let alone = autofix(dir.path(), &report, &[FixClass::DisableUnfixable], false, &config)?;
        assert!(alone.fixes.is_empty());
        let both = autofix(
            dir.path(),
            &report,
            &[FixClass::Links, FixClass::DisableUnfixable],
            false,
            &config,
        )?;
        assert_eq!(both.fixes.len(), 1);
        assert_eq!(both.fixes[0].after, "#");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_failed_fix() -> TestResult {
        let dir = tempdir()?;
        let set = SourceSet::new(vec![
            SourceFile::new("client/src/App.tsx", APP).with_class(LanguageClass::Frontend),
            SourceFile::new("client/src/Nav.tsx", r#"<Link href="/Courses">C</Link>"#)
                .with_class(LanguageClass::Frontend),
        ]);
        let config = Config::default();
        let report = analyze(&set, &config);
        let outcome = autofix(dir.path(), &report, &[FixClass::Links], true, &config)?;
        assert_eq!(outcome.failed(), 1);
        assert!(outcome.fixes[0].error.is_some());
        Ok(())
    }

    #[test]
    fn test_write_failure_keeps_backup_and_other_files() -> TestResult {
        let dir = tempdir()?;
        let link = r#"<Link href="/Courses">C</Link>"#;
        let set = write_tree(
            dir.path(),
            &[("client/src/App.tsx", APP), ("client/src/Foot.tsx", link), ("client/src/Nav.tsx", link)],
        )?;
        let config = Config::default();
        let report = analyze(&set, &config);

        // Nav.tsx was read; it turns into a directory before the write.
        let nav = dir.path().join("client/src/Nav.tsx");
        fs::remove_file(&nav)?;
        fs::create_dir(&nav)?;

        let mut engine = AutofixEngine::new(dir.path(), &config, true);
        let classes: BTreeSet<FixClass> = [FixClass::Links].into_iter().collect();
        for (file, changes) in literal_changes(&report, &classes) {
            let text = set.get(&file).map(|f| f.text.clone()).unwrap_or_default();
            engine.rewrite_text(&file, &text, changes, false);
        }

        let status = |file: &str| engine.fixes.iter().find(|f| f.file == file).map(|f| f.status);
        assert_eq!(status("client/src/Nav.tsx"), Some(FixStatus::Failed));
        assert_eq!(status("client/src/Foot.tsx"), Some(FixStatus::Applied));
        assert!(engine.fixes.iter().all(|f| f.status != FixStatus::Failed || f.error.is_some()));

        let run = engine.backup.as_ref().ok_or("no backup run")?;
        assert_eq!(fs::read_to_string(run.dir().join("client__src__Nav.tsx"))?, link);
        assert_eq!(
            fs::read_to_string(dir.path().join("client/src/Foot.tsx"))?,
            r#"<Link href="/courses">C</Link>"#
        );
        Ok(())
    }
}
