use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// Which files make up each source set, and what the scanners skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_page_globs")]
    pub page_globs: Vec<String>,
    #[serde(default = "default_frontend_globs")]
    pub frontend_globs: Vec<String>,
    #[serde(default = "default_backend_globs")]
    pub backend_globs: Vec<String>,
    #[serde(default = "default_schema_globs")]
    pub schema_globs: Vec<String>,
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    #[serde(default = "default_route_file_hints")]
    pub route_file_hints: Vec<String>,
    #[serde(default = "default_ignored_link_prefixes")]
    pub ignored_link_prefixes: Vec<String>,
    #[serde(default)]
    pub allowed_api_hosts: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_globs: default_page_globs(),
            frontend_globs: default_frontend_globs(),
            backend_globs: default_backend_globs(),
            schema_globs: default_schema_globs(),
            skip_dirs: default_skip_dirs(),
            route_file_hints: default_route_file_hints(),
            ignored_link_prefixes: default_ignored_link_prefixes(),
            allowed_api_hosts: Vec::new(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_page_globs() -> Vec<String> {
    strings(&["src/pages/**/*.tsx", "client/src/pages/**/*.tsx"])
}

fn default_frontend_globs() -> Vec<String> {
    strings(&[
        "src/**/*.ts",
        "src/**/*.tsx",
        "client/src/**/*.ts",
        "client/src/**/*.tsx",
    ])
}

fn default_backend_globs() -> Vec<String> {
    strings(&["server/**/*.ts", "server/**/*.tsx", "routers/**/*.ts"])
}

fn default_schema_globs() -> Vec<String> {
    strings(&["drizzle/**/*.ts", "db/schema.ts", "server/schema.ts"])
}

fn default_skip_dirs() -> Vec<String> {
    strings(&[
        "node_modules",
        "dist",
        "build",
        ".git",
        ".turbo",
        ".next",
        ".vite",
        ".cache",
        ".pnpm",
        "coverage",
        ".navwarden_backups",
    ])
}

fn default_route_file_hints() -> Vec<String> {
    strings(&[
        "client/src/App.tsx",
        "src/App.tsx",
        "client/src/app.tsx",
        "src/app.tsx",
        "client/src/Router.tsx",
        "src/Router.tsx",
        "client/src/routes.tsx",
        "src/routes.tsx",
    ])
}

fn default_ignored_link_prefixes() -> Vec<String> {
    strings(&[
        "/api", "/assets", "/favicon", "/public", "/static", "/uploads", "/images", "/fonts",
    ])
}

/// Category weights for the overall score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Weights {
    #[serde(default = "default_w_navigation")]
    pub navigation: f64,
    #[serde(default = "default_w_security")]
    pub security: f64,
    #[serde(default = "default_w_rpc")]
    pub rpc: f64,
    #[serde(default = "default_w_quality")]
    pub quality: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            navigation: default_w_navigation(),
            security: default_w_security(),
            rpc: default_w_rpc(),
            quality: default_w_quality(),
        }
    }
}

const fn default_w_navigation() -> f64 { 0.35 }
const fn default_w_security() -> f64 { 0.25 }
const fn default_w_rpc() -> f64 { 0.30 }
const fn default_w_quality() -> f64 { 0.10 }

/// Per-finding point deductions. Empirical values; changing them is a product decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Penalties {
    #[serde(default = "default_broken_link")]
    pub broken_link: u32,
    #[serde(default = "default_orphan_page")]
    pub orphan_page: u32,
    #[serde(default = "default_no_routes")]
    pub no_routes: u32,
    #[serde(default = "default_security_critical")]
    pub security_critical: u32,
    #[serde(default = "default_security_warning")]
    pub security_warning: u32,
    #[serde(default = "default_ghost_call")]
    pub ghost_call: u32,
    #[serde(default = "default_ghost_call_cap")]
    pub ghost_call_cap: u32,
    #[serde(default = "default_dead_procedure")]
    pub dead_procedure: u32,
    #[serde(default = "default_dead_procedure_cap")]
    pub dead_procedure_cap: u32,
    #[serde(default = "default_todo_marker")]
    pub todo_marker: u32,
    #[serde(default = "default_console_excess")]
    pub console_excess: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            broken_link: default_broken_link(),
            orphan_page: default_orphan_page(),
            no_routes: default_no_routes(),
            security_critical: default_security_critical(),
            security_warning: default_security_warning(),
            ghost_call: default_ghost_call(),
            ghost_call_cap: default_ghost_call_cap(),
            dead_procedure: default_dead_procedure(),
            dead_procedure_cap: default_dead_procedure_cap(),
            todo_marker: default_todo_marker(),
            console_excess: default_console_excess(),
        }
    }
}

const fn default_broken_link() -> u32 { 2 }
const fn default_orphan_page() -> u32 { 2 }
const fn default_no_routes() -> u32 { 40 }
const fn default_security_critical() -> u32 { 15 }
const fn default_security_warning() -> u32 { 5 }
const fn default_ghost_call() -> u32 { 8 }
const fn default_ghost_call_cap() -> u32 { 60 }
const fn default_dead_procedure() -> u32 { 2 }
const fn default_dead_procedure_cap() -> u32 { 20 }
const fn default_todo_marker() -> u32 { 1 }
const fn default_console_excess() -> u32 { 1 }

/// Heuristic thresholds used by the analysis rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_console_log_limit")]
    pub console_log_limit: usize,
    #[serde(default = "default_sensitive_verbs")]
    pub sensitive_verbs: Vec<String>,
    #[serde(default = "default_ghost_severity")]
    pub ghost_call_severity: Severity,
    #[serde(default = "default_dead_severity")]
    pub dead_procedure_severity: Severity,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            console_log_limit: default_console_log_limit(),
            sensitive_verbs: default_sensitive_verbs(),
            ghost_call_severity: default_ghost_severity(),
            dead_procedure_severity: default_dead_severity(),
        }
    }
}

const fn default_similarity_threshold() -> f64 { 0.80 }
const fn default_console_log_limit() -> usize { 3 }
const fn default_ghost_severity() -> Severity { Severity::Critical }
const fn default_dead_severity() -> Severity { Severity::Warning }

fn default_sensitive_verbs() -> Vec<String> {
    strings(&[
        "create", "update", "delete", "remove", "insert", "admin", "user", "profile",
        "payment", "invoice", "cashback",
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofixConfig {
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
    /// Where stub pages are created. Falls back to the first existing page directory.
    #[serde(default)]
    pub pages_dir: Option<String>,
}

impl Default for AutofixConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            backup_retention: default_backup_retention(),
            pages_dir: None,
        }
    }
}

fn default_backup_dir() -> String { ".navwarden_backups".to_string() }
const fn default_backup_retention() -> usize { 5 }

/// On-disk shape of `navwarden.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NavWardenToml {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub penalties: Penalties,
    #[serde(default)]
    pub rules: RuleConfig,
    #[serde(default)]
    pub autofix: AutofixConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scan: ScanConfig,
    pub weights: Weights,
    pub penalties: Penalties,
    pub rules: RuleConfig,
    pub autofix: AutofixConfig,
}
