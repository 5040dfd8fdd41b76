use serde::{Deserialize, Serialize};

/// Issue severity. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Navigation,
    #[serde(rename = "RPC-Alignment")]
    RpcAlignment,
    #[serde(rename = "RPC-Security")]
    RpcSecurity,
    Security,
    Auth,
    CodeQuality,
}

impl Category {
    /// Categories that count against the security score.
    #[must_use]
    pub fn is_security(self) -> bool {
        matches!(self, Self::Security | Self::Auth | Self::RpcSecurity)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::RpcAlignment => "RPC-Alignment",
            Self::RpcSecurity => "RPC-Security",
            Self::Security => "Security",
            Self::Auth => "Auth",
            Self::CodeQuality => "CodeQuality",
        }
    }
}

/// A uniform finding. Derived every run, never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub file: String,
    pub line: usize,
    pub title: String,
    pub detail: String,
    pub fix_hint: String,
    pub fix_available: bool,
    pub fix_applied: bool,
    /// Literal the issue is about (link target, literal URL), used to pair applied fixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Issue {
    #[must_use]
    pub fn new(
        severity: Severity,
        category: Category,
        file: impl Into<String>,
        line: usize,
        title: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            file: file.into(),
            line,
            title: title.into(),
            detail: String::new(),
            fix_hint: String::new(),
            fix_available: false,
            fix_applied: false,
            subject: None,
        }
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = hint.into();
        self
    }

    #[must_use]
    pub fn fixable(mut self, available: bool) -> Self {
        self.fix_available = available;
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}
