// tests/autofix.rs
use navwarden_core::config::{Config, ScanConfig};
use navwarden_core::fix::backup::flat_name;
use navwarden_core::{audit, autofix, FixClass, FixStatus};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const APP: &str = r#"import Home from "./pages/Home";
import Courses from "./pages/Courses";

export default function App() {
  return (
    <Switch>
      <Route path="/" component={Home} />
      <Route path="/courses" component={Courses} />
      <Route path="/login" component={Login} />
      <Route component={NotFound} />
    </Switch>
  );
}
"#;

const NAV: &str = r#"export function Nav() {
  return (
    <nav>
      <Link href="/Courses">Courses</Link>
      <a href="/Courses">All courses</a>
    </nav>
  );
}
"#;

const NAV_FILE: &str = "client/src/components/Nav.tsx";

fn write(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (rel, text) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
    }
    Ok(())
}

fn project(root: &Path, extra: &[(&str, &str)]) -> Result<()> {
    let mut files = vec![
        ("client/src/App.tsx", APP),
        ("client/src/pages/Home.tsx", "export default function Home() { return null; }\n"),
        ("client/src/pages/Courses.tsx", "export default function Courses() { return null; }\n"),
        ("client/src/pages/Login.tsx", "export default function Login() { return null; }\n"),
    ];
    files.extend_from_slice(extra);
    write(root, &files)
}

#[test]
fn test_same_href_twice_replaced_identically() -> Result<()> {
    let d = tempdir()?;
    project(d.path(), &[(NAV_FILE, NAV)])?;
    let config = Config::default();

    let report = audit(d.path(), &ScanConfig::default())?;
    assert_eq!(report.broken_links.len(), 2);
    let outcome = autofix(d.path(), &report, &[FixClass::Links], true, &config)?;

    assert_eq!(outcome.fixes.len(), 1);
    let fix = &outcome.fixes[0];
    assert_eq!(fix.status, FixStatus::Applied);
    assert_eq!(fix.file, NAV_FILE);
    assert_eq!(fix.occurrences, 2);
    assert_eq!((fix.before.as_str(), fix.after.as_str()), ("/Courses", "/courses"));
    let changed = |sign: char| {
        fix.diff
            .lines()
            .filter(|l| l.starts_with(sign) && !l.starts_with("---") && !l.starts_with("+++"))
            .count()
    };
    assert_eq!((changed('-'), changed('+')), (2, 2));

    let text = fs::read_to_string(d.path().join(NAV_FILE))?;
    assert_eq!(text, NAV.replace("\"/Courses\"", "\"/courses\""));

    let backup = outcome.backup_dir.ok_or("no backup dir")?;
    assert_eq!(fs::read_to_string(backup.join(flat_name(NAV_FILE)))?, NAV);
    Ok(())
}

#[test]
fn test_fix_record_is_reproducible() -> Result<()> {
    let mut records = Vec::new();
    for _ in 0..2 {
        let d = tempdir()?;
        project(d.path(), &[(NAV_FILE, NAV)])?;
        let report = audit(d.path(), &ScanConfig::default())?;
        let outcome = autofix(d.path(), &report, &[FixClass::Links], true, &Config::default())?;
        let summary: Vec<(String, usize, String)> = outcome
            .fixes
            .iter()
            .map(|f| (f.file.clone(), f.occurrences, f.diff.clone()))
            .collect();
        records.push(summary);
    }
    assert_eq!(records[0], records[1]);
    Ok(())
}

#[test]
fn test_second_apply_is_noop() -> Result<()> {
    let d = tempdir()?;
    project(d.path(), &[(NAV_FILE, NAV), ("client/src/components/Foot.tsx", "<a href=\"/courses/\">c</a>\n")])?;
    let config = Config::default();

    let first = autofix(d.path(), &audit(d.path(), &config.scan)?, &[FixClass::Links], true, &config)?;
    assert_eq!(first.applied(), 2);
    let after_first = fs::read_to_string(d.path().join("client/src/components/Foot.tsx"))?;
    assert_eq!(after_first, "<a href=\"/courses\">c</a>\n");

    let second = autofix(d.path(), &audit(d.path(), &config.scan)?, &[FixClass::Links], true, &config)?;
    assert!(second.fixes.is_empty());
    assert!(second.backup_dir.is_none());
    Ok(())
}

#[test]
fn test_dry_run_leaves_tree_untouched() -> Result<()> {
    let d = tempdir()?;
    project(d.path(), &[(NAV_FILE, NAV)])?;
    let config = Config::default();
    let report = audit(d.path(), &config.scan)?;

    let outcome = autofix(d.path(), &report, &FixClass::ALL, false, &config)?;
    assert!(!outcome.fixes.is_empty());
    assert!(outcome.fixes.iter().all(|f| f.status == FixStatus::Planned));
    assert!(outcome.backup_dir.is_none());
    assert_eq!(fs::read_to_string(d.path().join(NAV_FILE))?, NAV);
    assert!(!d.path().join(&config.autofix.backup_dir).exists());
    Ok(())
}

#[test]
fn test_stub_pages_and_route_registration() -> Result<()> {
    let d = tempdir()?;
    project(
        d.path(),
        &[
            (NAV_FILE, "<Link href=\"/pricing\">Pricing</Link>\n"),
            ("client/src/pages/About.tsx", "export default function About() { return null; }\n"),
        ],
    )?;
    let config = Config::default();
    let mut report = audit(d.path(), &config.scan)?;
    assert_eq!(report.orphan_pages.len(), 1);
    assert_eq!(report.broken_links.len(), 1);

    let outcome = autofix(
        d.path(),
        &report,
        &[FixClass::StubPages, FixClass::AddRoutes],
        true,
        &config,
    )?;
    let kinds: Vec<FixClass> = outcome.fixes.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, [FixClass::StubPages, FixClass::AddRoutes]);
    assert_eq!(outcome.failed(), 0);

    let stub = fs::read_to_string(d.path().join("client/src/pages/Pricing.tsx"))?;
    assert!(stub.contains("export default function Pricing()"));
    let app = fs::read_to_string(d.path().join("client/src/App.tsx"))?;
    assert!(app.contains("import About from \"./pages/About\";\nimport Pricing from \"./pages/Pricing\";\n"));
    assert!(app.contains(
        "      <Route path=\"/about\" component={About} />\n      <Route path=\"/pricing\" component={Pricing} />\n      <Route component={NotFound} />"
    ));

    report.attach_fixes(&outcome.fixes);
    assert_eq!(report.counts.fixes_applied, 2);
    assert!(report
        .issues
        .iter()
        .filter(|i| i.title.starts_with("Broken link") || i.title.starts_with("Orphan page"))
        .all(|i| i.fix_applied));

    let again = audit(d.path(), &config.scan)?;
    assert!(again.broken_links.is_empty());
    assert!(again.orphan_pages.is_empty());
    let rerun = autofix(d.path(), &again, &[FixClass::StubPages, FixClass::AddRoutes], true, &config)?;
    assert!(rerun.fixes.is_empty());
    Ok(())
}

#[test]
fn test_existing_stub_target_yields_no_fix() -> Result<()> {
    let d = tempdir()?;
    project(
        d.path(),
        &[
            (NAV_FILE, "<Link href=\"/pricing\">Pricing</Link>\n"),
            ("client/src/pages/Pricing.tsx", "export default function Pricing() { return 1; }\n"),
        ],
    )?;
    let config = Config::default();
    let report = audit(d.path(), &config.scan)?;
    let outcome = autofix(d.path(), &report, &[FixClass::StubPages], true, &config)?;
    assert!(outcome.fixes.is_empty());
    Ok(())
}

#[test]
fn test_login_gateway_rewrite() -> Result<()> {
    let d = tempdir()?;
    let login = "<a href=\"/api/auth/google\">Google</a>\n<a href=\"/api/auth/github\">GitHub</a>\n";
    project(d.path(), &[("client/src/components/SignIn.tsx", login)])?;
    let config = Config::default();
    let mut report = audit(d.path(), &config.scan)?;

    let outcome = autofix(d.path(), &report, &[FixClass::LoginGateway], true, &config)?;
    assert_eq!(outcome.applied(), 2);
    let text = fs::read_to_string(d.path().join("client/src/components/SignIn.tsx"))?;
    assert_eq!(
        text,
        "<a href=\"/login?provider=google\">Google</a>\n<a href=\"/login?provider=github\">GitHub</a>\n"
    );

    report.attach_fixes(&outcome.fixes);
    assert!(report
        .issues
        .iter()
        .filter(|i| i.title == "Direct auth-provider link")
        .all(|i| i.fix_applied));
    Ok(())
}

#[test]
fn test_disable_unfixable_spares_stub_targets() -> Result<()> {
    let d = tempdir()?;
    project(d.path(), &[(NAV_FILE, "<Link href=\"/pricing\">P</Link>\n<Link href=\"/x/:id\">X</Link>\n")])?;
    let config = Config::default();
    let report = audit(d.path(), &config.scan)?;

    let outcome = autofix(
        d.path(),
        &report,
        &[FixClass::Links, FixClass::DisableUnfixable, FixClass::StubPages],
        false,
        &config,
    )?;
    let disabled: Vec<&str> = outcome
        .fixes
        .iter()
        .filter(|f| f.kind == FixClass::DisableUnfixable)
        .map(|f| f.before.as_str())
        .collect();
    assert_eq!(disabled, ["/x/:id"]);
    assert!(outcome.fixes.iter().any(|f| f.kind == FixClass::StubPages && f.file.ends_with("Pricing.tsx")));
    Ok(())
}

#[test]
fn test_add_routes_targets_file_with_switch() -> Result<()> {
    let d = tempdir()?;
    let routes = "import Home from \"./pages/Home\";\n\nexport function AppRoutes() {\n  return (\n    <Switch>\n      <Route path=\"/\" component={Home} />\n    </Switch>\n  );\n}\n";
    write(
        d.path(),
        &[
            ("client/src/App.tsx", "export default function App() {\n  return <AppRoutes />;\n}\n"),
            ("client/src/routes.tsx", routes),
            ("client/src/pages/Home.tsx", "export default function Home() { return null; }\n"),
            ("client/src/pages/About.tsx", "export default function About() { return null; }\n"),
        ],
    )?;
    let config = Config::default();
    let report = audit(d.path(), &config.scan)?;
    assert_eq!(report.orphan_pages.len(), 1);

    let outcome = autofix(d.path(), &report, &[FixClass::AddRoutes], true, &config)?;
    assert_eq!(outcome.failed(), 0);
    assert_eq!(outcome.fixes.len(), 1);
    assert_eq!(outcome.fixes[0].file, "client/src/routes.tsx");
    let text = fs::read_to_string(d.path().join("client/src/routes.tsx"))?;
    assert!(text.contains("import About from \"./pages/About\";"));
    assert!(text.contains("<Route path=\"/about\" component={About} />"));
    assert!(!fs::read_to_string(d.path().join("client/src/App.tsx"))?.contains("About"));
    Ok(())
}
