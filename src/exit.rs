// src/exit.rs
//! Process exit codes for `navwarden`.
//!
//! Provides a stable contract for CI wrappers.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NavWardenExit {
    /// Completed with no outstanding CRITICAL issue.
    Success = 0,
    /// Generic error (IO, config, invalid arguments).
    Error = 1,
    /// At least one CRITICAL issue remains after requested fixes.
    CriticalIssues = 2,
}

impl NavWardenExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// `CriticalIssues` when any CRITICAL issue is still outstanding.
    #[must_use]
    pub fn from_critical(outstanding: usize) -> Self {
        if outstanding > 0 {
            Self::CriticalIssues
        } else {
            Self::Success
        }
    }
}

impl Termination for NavWardenExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(NavWardenExit::Success.code(), 0);
        assert_eq!(NavWardenExit::Error.code(), 1);
        assert_eq!(NavWardenExit::from_critical(3), NavWardenExit::CriticalIssues);
        assert_eq!(NavWardenExit::from_critical(0).code(), 0);
    }
}
