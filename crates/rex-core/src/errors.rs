//! Structured error types shared across REX crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic payload carried by every [`RexError`] variant.
///
/// `code` is a stable machine readable identifier that tests and tooling
/// match on; `message` and the context map are for humans and may change
/// freely between releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (rung indices, replica ids, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Attaches a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the replica-exchange coordinator.
///
/// The variants mirror the run-level failure taxonomy: ladder construction
/// and configuration errors are fatal before any simulation work starts,
/// integrator divergence degrades a single replica lane while the run
/// continues, and a non-adjacent exchange request is a caller defect that
/// must leave all state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RexError {
    /// Ladder construction failed (too short or not strictly monotonic).
    #[error("invalid ladder: {0}")]
    InvalidLadder(ErrorInfo),
    /// Exchange requested between rungs that are not nearest neighbours.
    #[error("non-adjacent exchange: {0}")]
    NonAdjacentExchange(ErrorInfo),
    /// The integrator diverged (non-finite energy, force blow-up, timeout).
    #[error("integrator divergence: {0}")]
    IntegratorDivergence(ErrorInfo),
    /// Run configuration errors detected before simulation work begins.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and artifact I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl RexError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RexError::InvalidLadder(info)
            | RexError::NonAdjacentExchange(info)
            | RexError::IntegratorDivergence(info)
            | RexError::Config(info)
            | RexError::Serde(info) => info,
        }
    }

    /// True when the error degrades a single replica lane rather than the run.
    pub fn is_divergence(&self) -> bool {
        matches!(self, RexError::IntegratorDivergence(_))
    }
}
