// src/fix/backup.rs
use crate::error::{NavWardenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MANIFEST_FILE: &str = "__manifest__.json";
const SEPARATOR: &str = "__";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// What one run touched. Rewritten after every change so a killed run is still restorable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Relative path -> flat file name inside the run directory.
    #[serde(default)]
    pub backed_up: BTreeMap<String, String>,
    /// Files that did not exist before the run.
    #[serde(default)]
    pub created: Vec<String>,
}

/// `client/src/App.tsx` -> `client__src__App.tsx`.
#[must_use]
pub fn flat_name(rel: &str) -> String {
    rel.replace('/', SEPARATOR)
}

#[must_use]
pub fn unflatten(name: &str) -> String {
    name.replace(SEPARATOR, "/")
}

/// One timestamped backup directory shared by every write of a run.
#[derive(Debug)]
pub struct BackupRun {
    dir: PathBuf,
    manifest: Manifest,
}

impl BackupRun {
    /// Creates `<root>/<backup_dir>/<YYYYmmdd_HHMMSS>`, adding `-N` if taken.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn create(root: &Path, backup_dir: &str) -> Result<Self> {
        let parent = root.join(backup_dir);
        fs::create_dir_all(&parent).map_err(|e| NavWardenError::io(e, &parent))?;
        let stamp = chrono::Local::now().format(STAMP_FORMAT).to_string();

        let mut n = 0usize;
        loop {
            let name = if n == 0 { stamp.clone() } else { format!("{stamp}-{n}") };
            let dir = parent.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    debug!(dir = %dir.display(), "backup run created");
                    let run = Self {
                        dir,
                        manifest: Manifest::default(),
                    };
                    run.persist()?;
                    return Ok(run);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(NavWardenError::io(e, &dir)),
            }
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Saves the pre-image of `rel`. Only the first pre-image per run is kept.
    ///
    /// # Errors
    /// Returns error if the copy or the manifest write fails, or if another
    /// file of the run already owns the same flat name.
    pub fn backup(&mut self, rel: &str, pre_image: &str) -> Result<()> {
        if self.manifest.backed_up.contains_key(rel) || self.manifest.created.iter().any(|c| c == rel) {
            return Ok(());
        }
        let flat = flat_name(rel);
        if let Some(other) = self.manifest.backed_up.iter().find_map(|(k, v)| (*v == flat).then_some(k)) {
            return Err(NavWardenError::Backup(format!(
                "{rel} and {other} share the backup name {flat}"
            )));
        }
        let dest = self.dir.join(&flat);
        fs::write(&dest, pre_image).map_err(|e| NavWardenError::io(e, &dest))?;
        self.manifest.backed_up.insert(rel.to_string(), flat);
        self.persist()
    }

    /// Records that `rel` is about to be created, so restore removes it.
    ///
    /// # Errors
    /// Returns error if the manifest write fails.
    pub fn record_created(&mut self, rel: &str) -> Result<()> {
        if self.manifest.created.iter().any(|c| c == rel) {
            return Ok(());
        }
        self.manifest.created.push(rel.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let path = self.dir.join(MANIFEST_FILE);
        let text = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(&path, text).map_err(|e| NavWardenError::io(e, &path))
    }
}

/// Files put back and files removed by a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: Vec<String>,
    pub removed: Vec<String>,
}

/// Restores every backed-up file of the run in `dir` and deletes files the run created.
///
/// Without a manifest every flat copy in `dir` is restored by its decoded name.
///
/// # Errors
/// Returns error if `dir` is missing or a restore write fails.
pub fn restore(root: &Path, dir: &Path) -> Result<RestoreSummary> {
    if !dir.is_dir() {
        return Err(NavWardenError::Backup(format!(
            "backup directory not found: {}",
            dir.display()
        )));
    }
    let manifest = read_manifest(dir)?.unwrap_or_else(|| scan_flat_copies(dir));
    let mut summary = RestoreSummary::default();

    for (rel, flat) in &manifest.backed_up {
        let src = dir.join(flat);
        let dest = root.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| NavWardenError::io(e, parent))?;
        }
        fs::copy(&src, &dest).map_err(|e| NavWardenError::io(e, &dest))?;
        summary.restored.push(rel.clone());
    }
    for rel in &manifest.created {
        let path = root.join(rel);
        match fs::remove_file(&path) {
            Ok(()) => summary.removed.push(rel.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(NavWardenError::io(e, &path)),
        }
    }
    debug!(
        restored = summary.restored.len(),
        removed = summary.removed.len(),
        "backup restored"
    );
    Ok(summary)
}

fn read_manifest(dir: &Path) -> Result<Option<Manifest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| NavWardenError::io(e, &path))?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn scan_flat_copies(dir: &Path) -> Manifest {
    let mut manifest = Manifest::default();
    let Ok(entries) = fs::read_dir(dir) else {
        return manifest;
    };
    for entry in entries.flatten() {
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != MANIFEST_FILE {
            manifest.backed_up.insert(unflatten(&name), name);
        }
    }
    manifest
}

/// Run directories under `<root>/<backup_dir>`, newest first.
fn runs(root: &Path, backup_dir: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root.join(backup_dir)) else {
        return Vec::new();
    };
    let mut runs: Vec<((String, usize), PathBuf)> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| {
            let path = e.path();
            let key = run_key(&path.file_name()?.to_string_lossy())?;
            Some((key, path))
        })
        .collect();
    runs.sort_by(|a, b| b.0.cmp(&a.0));
    runs.into_iter().map(|(_, p)| p).collect()
}

/// Sort key for `YYYYmmdd_HHMMSS[-N]`; anything else is not a run.
fn run_key(name: &str) -> Option<(String, usize)> {
    let (stamp, n) = match name.split_once('-') {
        Some((stamp, n)) => (stamp, n.parse().ok()?),
        None => (name, 0),
    };
    chrono::NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    Some((stamp.to_string(), n))
}

/// Newest run directory, if any.
#[must_use]
pub fn latest_backup(root: &Path, backup_dir: &str) -> Option<PathBuf> {
    runs(root, backup_dir).into_iter().next()
}

/// Deletes all but the newest `retention` runs.
pub fn cleanup_old_backups(root: &Path, backup_dir: &str, retention: usize) {
    for path in runs(root, backup_dir).into_iter().skip(retention) {
        if let Err(e) = fs::remove_dir_all(&path) {
            warn!(dir = %path.display(), error = %e, "could not prune backup run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_flat_names() {
        assert_eq!(flat_name("client/src/App.tsx"), "client__src__App.tsx");
        assert_eq!(unflatten("client__src__App.tsx"), "client/src/App.tsx");
    }

    #[test]
    fn test_run_key() {
        assert_eq!(run_key("20240102_030405"), Some(("20240102_030405".to_string(), 0)));
        assert_eq!(run_key("20240102_030405-2"), Some(("20240102_030405".to_string(), 2)));
        assert_eq!(run_key("notes"), None);
        assert_eq!(run_key("20240102_030405-x"), None);
    }

    #[test]
    fn test_backup_keeps_first_pre_image() -> TestResult {
        let dir = tempdir()?;
        let mut run = BackupRun::create(dir.path(), ".bk")?;
        run.backup("src/a.ts", "one")?;
        run.backup("src/a.ts", "two")?;
        assert_eq!(fs::read_to_string(run.dir().join("src__a.ts"))?, "one");
        assert_eq!(run.manifest().backed_up.len(), 1);
        Ok(())
    }

    #[test]
    fn test_flat_name_collision_is_refused() -> TestResult {
        let dir = tempdir()?;
        let mut run = BackupRun::create(dir.path(), ".bk")?;
        run.backup("a/b.tsx", "nested")?;
        assert!(run.backup("a__b.tsx", "flat").is_err());
        assert_eq!(fs::read_to_string(run.dir().join("a__b.tsx"))?, "nested");
        assert_eq!(run.manifest().backed_up.len(), 1);
        Ok(())
    }

    #[test]
    fn test_restore_and_remove_created() -> TestResult {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/a.ts"), "original")?;

        let mut run = BackupRun::create(root, ".bk")?;
        run.backup("src/a.ts", "original")?;
        fs::write(root.join("src/a.ts"), "changed")?;
        run.record_created("src/New.tsx")?;
        fs::write(root.join("src/New.tsx"), "stub")?;

        let summary = restore(root, run.dir())?;
        assert_eq!(summary.restored, ["src/a.ts"]);
        assert_eq!(summary.removed, ["src/New.tsx"]);
        assert_eq!(fs::read_to_string(root.join("src/a.ts"))?, "original");
        assert!(!root.join("src/New.tsx").exists());
        Ok(())
    }

    #[test]
    fn test_restore_without_manifest() -> TestResult {
        let dir = tempdir()?;
        let root = dir.path();
        let run_dir = root.join(".bk/20240101_000000");
        fs::create_dir_all(&run_dir)?;
        fs::write(run_dir.join("client__src__App.tsx"), "saved")?;
        let summary = restore(root, &run_dir)?;
        assert_eq!(summary.restored, ["client/src/App.tsx"]);
        assert_eq!(fs::read_to_string(root.join("client/src/App.tsx"))?, "saved");
        Ok(())
    }

    #[test]
    fn test_collision_suffix_and_retention() -> TestResult {
        let dir = tempdir()?;
        let root = dir.path();
        let first = BackupRun::create(root, ".bk")?;
        let second = BackupRun::create(root, ".bk")?;
        assert_ne!(first.dir(), second.dir());
        fs::create_dir_all(root.join(".bk/20000101_000000"))?;
        fs::create_dir_all(root.join(".bk/keep-me"))?;

        assert_eq!(runs(root, ".bk").len(), 3);
        cleanup_old_backups(root, ".bk", 1);
        assert_eq!(runs(root, ".bk").len(), 1);
        assert!(root.join(".bk/keep-me").exists());
        Ok(())
    }
}
