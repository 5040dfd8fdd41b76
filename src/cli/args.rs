use crate::fix::FixClass;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "navwarden", version, about = "Route, link and RPC cross-reference auditor")]
pub struct Cli {
    /// Project root to scan
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the project and report every inconsistency
    Audit {
        /// Print the JSON report instead of the console summary
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to FILE
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Propose fixes; write them only with --apply
    Fix {
        /// Write fixes (backed up first). Without it this is a dry run
        #[arg(long)]
        apply: bool,
        /// Repair broken and non-canonical link targets
        #[arg(long)]
        links: bool,
        /// With --links, replace unrepairable targets with `#`
        #[arg(long)]
        disable_unfixable: bool,
        /// Route direct auth-provider links through /login
        #[arg(long)]
        login_gateway: bool,
        /// Create placeholder pages for missing targets
        #[arg(long)]
        stub_pages: bool,
        /// Register orphan and stub pages in the routing file
        #[arg(long)]
        add_routes: bool,
        /// Every fix class
        #[arg(long)]
        all: bool,
        /// Print the JSON report after fixing
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to FILE
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Undo a fix run from its backup
    Restore {
        /// Run directory to restore (latest by default)
        #[arg(long, value_name = "DIR")]
        backup: Option<PathBuf>,
    },
}

/// Arguments for the fix command (used by handlers)
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct FixArgs {
    pub apply: bool,
    pub links: bool,
    pub disable_unfixable: bool,
    pub login_gateway: bool,
    pub stub_pages: bool,
    pub add_routes: bool,
    pub all: bool,
    pub json: bool,
    pub out: Option<PathBuf>,
}

impl FixArgs {
    /// Requested classes. No class flag at all means `links`.
    #[must_use]
    pub fn classes(&self) -> Vec<FixClass> {
        if self.all {
            return FixClass::ALL.to_vec();
        }
        let flags = [
            (self.links, FixClass::Links),
            (self.disable_unfixable, FixClass::DisableUnfixable),
            (self.login_gateway, FixClass::LoginGateway),
            (self.stub_pages, FixClass::StubPages),
            (self.add_routes, FixClass::AddRoutes),
        ];
        let classes: Vec<FixClass> = flags.iter().filter(|(on, _)| *on).map(|(_, c)| *c).collect();
        if classes.is_empty() {
            vec![FixClass::Links]
        } else {
            classes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fix_flags() {
        let cli = Cli::parse_from(["navwarden", "--root", "app", "fix", "--apply", "--stub-pages", "--add-routes"]);
        assert_eq!(cli.root, PathBuf::from("app"));
        let Some(Commands::Fix { apply, stub_pages, links, .. }) = cli.command else {
            panic!("expected fix command");
        };
        assert!(apply && stub_pages && !links);
    }

    #[test]
    fn test_default_and_all_classes() {
        assert_eq!(FixArgs::default().classes(), [FixClass::Links]);
        let all = FixArgs {
            all: true,
            ..FixArgs::default()
        };
        assert_eq!(all.classes().len(), 5);
        let some = FixArgs {
            login_gateway: true,
            ..FixArgs::default()
        };
        assert_eq!(some.classes(), [FixClass::LoginGateway]);
    }
}
