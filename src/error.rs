//! Error types for the solving pipeline.
//!
//! Infeasibility is not an error: `solve` reports it as `Ok(None)`. These
//! variants cover the two failure classes that are genuinely exceptional —
//! a back-end aborting, and a programmer misusing the formula builder.

use thiserror::Error;

/// A stable tag distinguishing the flavor of a back-end abort, so the
/// collaborator can show a tailored message without parsing `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFailureKind {
    /// The back-end ran out of memory building or solving the CNF.
    OutOfMemory,
    /// Any other internal back-end abort (assertion, panic caught at the
    /// FFI boundary, reported-SAT-with-no-model, ...).
    Other,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("SAT back-end failed ({kind:?}): {message}")]
    SolverFailure { kind: SolverFailureKind, message: String },

    #[error("variable name {0:?} already registered")]
    DuplicateVariableName(String),

    #[error("unknown variable name {0:?}")]
    UnknownVariable(String),

    #[error("shape mismatch: {0}")]
    Shape(#[from] crate::util::matrix::ShapeError),
}

impl SolveError {
    pub fn solver_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if message.to_lowercase().contains("memory") {
            SolverFailureKind::OutOfMemory
        } else {
            SolverFailureKind::Other
        };
        SolveError::SolverFailure { kind, message }
    }
}
