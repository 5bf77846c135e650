//! Diagnostics produced while lexing, parsing and rewriting Razor documents
//!
//! Diagnostics are plain data: a stable id, a severity, a message and the
//! source span they point at. Constructors for every id live in [`factory`].

pub mod factory;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::SourceSpan;

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Suspicious but compilable input
    Warning,
    /// Input that cannot be compiled as written
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RazorDiagnostic {
    /// Stable identifier such as `RZ1006`
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub span: SourceSpan,
}

impl RazorDiagnostic {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.span.start_location();
        write!(
            f,
            "{}: {} {}: {}",
            location, self.severity, self.id, self.message
        )
    }
}

/// Sort diagnostics by absolute offset, keeping insertion order for ties
pub fn sort_diagnostics(diagnostics: &mut [RazorDiagnostic]) {
    diagnostics.sort_by_key(|diagnostic| diagnostic.span.absolute_index);
}
