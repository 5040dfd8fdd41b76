use super::Report;
use crate::fix::{Fix, FixStatus};
use crate::types::{Issue, Severity};
use colored::Colorize;

/// Prints issues grouped by severity, then the score table.
pub fn print_report(report: &Report) {
    for issue in &report.issues {
        print_issue(issue);
    }
    if !report.issues.is_empty() {
        println!();
    }
    print_summary(report);
}

fn print_issue(issue: &Issue) {
    let label = match issue.severity {
        Severity::Critical => issue.severity.label().red().bold(),
        Severity::Warning => issue.severity.label().yellow(),
        Severity::Info => issue.severity.label().dimmed(),
    };
    let applied = if issue.fix_applied { " [fixed]".green().to_string() } else { String::new() };
    println!("{label} [{}] {}{applied}", issue.category.label(), issue.title);
    if issue.line > 0 {
        println!("  {} {}:{}", "-->".blue(), issue.file, issue.line);
    } else if !issue.file.is_empty() {
        println!("  {} {}", "-->".blue(), issue.file);
    }
    if !issue.detail.is_empty() {
        println!("   {} {}", "|".blue(), issue.detail.dimmed());
    }
    if !issue.fix_hint.is_empty() {
        println!("   {} {}", "=".blue(), issue.fix_hint);
    }
}

pub fn print_summary(report: &Report) {
    let s = &report.scores;
    let c = &report.counts;
    println!("{}", "navwarden audit".bold());
    println!(
        "  files {}  routes {}  links {}  procedures {}  usages {}",
        c.files, c.routes, c.links, c.procedures, c.usages
    );
    println!(
        "  navigation {}  security {}  rpc {}  quality {}",
        s.navigation, s.security, s.rpc, s.quality
    );
    let overall = format!("overall {}/100", s.overall);
    let overall = match s.overall {
        80.. => overall.green().bold(),
        50..=79 => overall.yellow().bold(),
        _ => overall.red().bold(),
    };
    println!("  {overall}");
    println!(
        "  {} critical, {} warning, {} info",
        c.critical.to_string().red(),
        c.warning.to_string().yellow(),
        c.info
    );
}

/// One line per fix, with the diff for applied or planned rewrites.
pub fn print_fixes(fixes: &[Fix], show_diff: bool) {
    if fixes.is_empty() {
        println!("{}", "No fixes to apply.".dimmed());
        return;
    }
    for fix in fixes {
        let status = match fix.status {
            FixStatus::Applied => "APPLIED".green().bold(),
            FixStatus::Planned => "PLANNED".cyan(),
            FixStatus::Failed => "FAILED".red().bold(),
        };
        println!("{status} {} {}: {}", fix.kind.label(), fix.file, fix.note);
        if let Some(err) = &fix.error {
            println!("   {} {}", "!".red(), err);
        }
        if show_diff && !fix.diff.is_empty() {
            for line in fix.diff.lines() {
                let painted = if line.starts_with('+') && !line.starts_with("+++") {
                    line.green()
                } else if line.starts_with('-') && !line.starts_with("---") {
                    line.red()
                } else {
                    line.normal()
                };
                println!("   {painted}");
            }
        }
    }
}
