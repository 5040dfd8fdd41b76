// tests/backup_restore.rs
use navwarden_core::config::Config;
use navwarden_core::fix::backup::{cleanup_old_backups, latest_backup, restore, MANIFEST_FILE};
use navwarden_core::{audit, autofix, FixClass};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const APP: &str = "<Switch>\n  <Route path=\"/\" component={Home} />\n  <Route path=\"/courses\" component={Courses} />\n</Switch>\n";
const NAV: &str = "<Link href=\"/Courses\">C</Link>\n<Link href=\"/pricing\">P</Link>\n";

fn setup(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("client/src/pages"))?;
    fs::create_dir_all(root.join("client/src/components"))?;
    fs::write(root.join("client/src/App.tsx"), APP)?;
    fs::write(root.join("client/src/components/Nav.tsx"), NAV)?;
    fs::write(root.join("client/src/pages/Home.tsx"), "export default function Home() {}\n")?;
    fs::write(root.join("client/src/pages/Courses.tsx"), "export default function Courses() {}\n")?;
    Ok(())
}

#[test]
fn test_restore_undoes_whole_run() -> Result<()> {
    let d = tempdir()?;
    let root = d.path();
    setup(root)?;
    let config = Config::default();
    let report = audit(root, &config.scan)?;

    let outcome = autofix(
        root,
        &report,
        &[FixClass::Links, FixClass::StubPages, FixClass::AddRoutes],
        true,
        &config,
    )?;
    assert_eq!(outcome.failed(), 0);
    assert!(root.join("client/src/pages/Pricing.tsx").exists());
    assert_ne!(fs::read_to_string(root.join("client/src/App.tsx"))?, APP);

    let dir = outcome.backup_dir.ok_or("no backup")?;
    assert!(dir.join(MANIFEST_FILE).exists());
    assert_eq!(latest_backup(root, &config.autofix.backup_dir).as_deref(), Some(dir.as_path()));

    let summary = restore(root, &dir)?;
    assert_eq!(summary.restored, ["client/src/App.tsx", "client/src/components/Nav.tsx"]);
    assert_eq!(summary.removed, ["client/src/pages/Pricing.tsx"]);
    assert_eq!(fs::read_to_string(root.join("client/src/App.tsx"))?, APP);
    assert_eq!(fs::read_to_string(root.join("client/src/components/Nav.tsx"))?, NAV);
    assert!(!root.join("client/src/pages/Pricing.tsx").exists());
    Ok(())
}

#[test]
fn test_backup_holds_first_pre_image_per_file() -> Result<()> {
    let d = tempdir()?;
    let root = d.path();
    setup(root)?;
    fs::write(root.join("client/src/App.tsx"), format!("{APP}<Link href=\"/courses/\">c</Link>\n"))?;
    let original = fs::read_to_string(root.join("client/src/App.tsx"))?;
    let config = Config::default();
    let report = audit(root, &config.scan)?;

    // App.tsx is rewritten by the link fix, then again by route registration.
    let outcome = autofix(root, &report, &[FixClass::Links, FixClass::StubPages, FixClass::AddRoutes], true, &config)?;
    let dir = outcome.backup_dir.ok_or("no backup")?;
    assert_eq!(fs::read_to_string(dir.join("client__src__App.tsx"))?, original);
    Ok(())
}

#[test]
fn test_no_backup_to_restore() {
    let d = tempdir().ok();
    let root = d.as_ref().map_or(Path::new("."), |d| d.path());
    assert!(latest_backup(root, ".navwarden_backups").is_none());
    assert!(restore(root, &root.join(".navwarden_backups/20240101_000000")).is_err());
}

#[test]
fn test_retention_prunes_oldest_runs() -> Result<()> {
    let d = tempdir()?;
    let root = d.path();
    for name in ["20240101_000000", "20240102_000000", "20240103_000000", "20240103_000000-1"] {
        fs::create_dir_all(root.join(".navwarden_backups").join(name))?;
    }
    cleanup_old_backups(root, ".navwarden_backups", 2);
    let latest = latest_backup(root, ".navwarden_backups").ok_or("no runs left")?;
    assert!(latest.ends_with("20240103_000000-1"));
    assert!(root.join(".navwarden_backups/20240103_000000").exists());
    assert!(!root.join(".navwarden_backups/20240102_000000").exists());
    Ok(())
}
