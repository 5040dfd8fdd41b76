// src/cli/handlers.rs
use crate::audit::audit_with_config;
use crate::cli::args::FixArgs;
use crate::config::Config;
use crate::exit::NavWardenExit;
use crate::fix::autofix;
use crate::fix::backup::{latest_backup, restore};
use crate::report::{self, Report};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

fn load_config(root: &Path) -> Result<Config> {
    Config::load(root).with_context(|| format!("loading config under {}", root.display()))
}

fn emit(report: &Report, json: bool, out: Option<&Path>) -> Result<()> {
    if json {
        print!("{}", report::json::to_json(report)?);
    } else {
        report::console::print_report(report);
    }
    if let Some(path) = out {
        report::json::write_json(report, path)?;
        if !json {
            println!("{} {}", "Report written to".dimmed(), path.display());
        }
    }
    Ok(())
}

/// Handles the audit command.
///
/// # Errors
/// Returns error if config loading, scanning, or report output fails.
pub fn handle_audit(root: &Path, json: bool, out: Option<&Path>) -> Result<NavWardenExit> {
    let config = load_config(root)?;
    let report = audit_with_config(root, &config)?;
    emit(&report, json, out)?;
    Ok(NavWardenExit::from_critical(report.outstanding_critical()))
}

/// Handles the fix command: audit, propose or apply, then report.
///
/// # Errors
/// Returns error if config loading, scanning, or report output fails.
pub fn handle_fix(root: &Path, args: &FixArgs) -> Result<NavWardenExit> {
    let config = load_config(root)?;
    let mut report = audit_with_config(root, &config)?;
    let outcome = autofix(root, &report, &args.classes(), args.apply, &config)?;
    report.attach_fixes(&outcome.fixes);

    if !args.json {
        report::console::print_fixes(&outcome.fixes, true);
        if let Some(dir) = &outcome.backup_dir {
            println!("{} {}", "Backup:".blue(), dir.display());
        }
        if !args.apply && !outcome.fixes.is_empty() {
            println!("{}", "Dry run. Re-run with --apply to write these fixes.".yellow());
        }
        println!();
    }
    emit(&report, args.json, args.out.as_deref())?;

    if outcome.failed() > 0 {
        return Ok(NavWardenExit::Error);
    }
    Ok(NavWardenExit::from_critical(report.outstanding_critical()))
}

/// Handles the restore command.
///
/// # Errors
/// Returns error if no backup exists or restoring fails.
pub fn handle_restore(root: &Path, backup: Option<&Path>) -> Result<NavWardenExit> {
    let config = load_config(root)?;
    let dir = match backup {
        Some(p) => resolve_backup(root, p),
        None => latest_backup(root, &config.autofix.backup_dir)
            .ok_or_else(|| anyhow!("no backup found under {}", root.join(&config.autofix.backup_dir).display()))?,
    };
    let summary = restore(root, &dir)?;
    for file in &summary.restored {
        println!("{} {file}", "restored".green());
    }
    for file in &summary.removed {
        println!("{} {file}", "removed".yellow());
    }
    println!("{} {}", "Restored from".dimmed(), dir.display());
    Ok(NavWardenExit::Success)
}

fn resolve_backup(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
