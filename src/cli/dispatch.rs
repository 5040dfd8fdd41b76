//! Command dispatch logic extracted from binary to reduce main function size.

use super::args::{Commands, FixArgs};
use super::handlers::{handle_audit, handle_fix, handle_restore};
use crate::exit::NavWardenExit;
use anyhow::Result;
use std::path::Path;

/// Executes the parsed command against `root`.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(root: &Path, command: Commands) -> Result<NavWardenExit> {
    match command {
        Commands::Audit { json, out } => handle_audit(root, json, out.as_deref()),
        Commands::Fix {
            apply,
            links,
            disable_unfixable,
            login_gateway,
            stub_pages,
            add_routes,
            all,
            json,
            out,
        } => handle_fix(
            root,
            &FixArgs {
                apply,
                links,
                disable_unfixable,
                login_gateway,
                stub_pages,
                add_routes,
                all,
                json,
                out,
            },
        ),
        Commands::Restore { backup } => handle_restore(root, backup.as_deref()),
    }
}
