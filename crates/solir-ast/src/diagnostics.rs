use crate::node::SrcNode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Diagnostic kinds that accumulate on the root instead of failing the
/// build. Hard failures (missing input, cancellation) are returned as errors
/// by the builder and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseError,
    ResolutionWarning,
    AmbiguousDefinition,
    InheritanceCycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub src: SrcNode,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, src: SrcNode) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            src,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>, src: SrcNode) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            src,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} at line {}, column {}: {}",
            self.kind, self.src.line, self.src.column, self.message
        )
    }
}
