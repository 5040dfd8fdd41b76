pub mod audit;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exit;
pub mod extract;
pub mod fix;
pub mod paths;
pub mod report;
pub mod scoring;
pub mod types;
pub mod xref;

pub use audit::{analyze, audit, audit_with_config};
pub use config::Config;
pub use error::{NavWardenError, Result};
pub use fix::{autofix, AutofixOutcome, Fix, FixClass, FixStatus};
pub use report::Report;
