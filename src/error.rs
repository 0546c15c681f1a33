//! Error types surfaced by the reconciler, program, generator and decoder.

use thiserror::Error;

/// A descriptor could not be applied to a native view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The view under this key is not the kind the descriptor configures.
    #[error("element '{key}' expects a {expected} view but found {found}")]
    IncompatibleView {
        key: String,
        expected: String,
        found: String,
    },
}

/// A reconciliation pass failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Two descriptors in one pass share a key. Nothing was mutated.
    #[error("duplicate element key '{0}' in one render pass")]
    DuplicateKey(String),

    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Layout code asked for something that was never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("no view rendered for key '{0}'")]
    MissingKey(String),
}

/// Failure of a render pass driven by a [`Program`](crate::Program).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("invalid range: max {max} is below min {min}")]
    InvalidRange { min: i64, max: i64 },
}

/// Errors building elements from their serialized form.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed element: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown element type '{0}'")]
    UnknownType(String),
}
