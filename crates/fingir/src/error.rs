//! Result and error types for Fingir.
//!
//! Every engine-detected error is synchronous and raised at the point of
//! detection. Misconfigured mocks fail loudly; nothing is swallowed or
//! retried.

use crate::contract::ValueKind;
use thiserror::Error;

/// Result type for Fingir operations
pub type MockResult<T> = Result<T, MockError>;

/// A failure injected by a `throws` behavior.
///
/// Faults are not engine errors: `dispatch` surfaces them unmodified, as if
/// the real operation had raised them. The `kind` is the caller's own error
/// taxonomy (e.g. `"index_out_of_range"`); the engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    /// Caller-defined error kind
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl Fault {
    /// Create a new fault with the given kind and message.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur in Fingir
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MockError {
    /// Operation is not declared by the capability contract
    #[error("contract '{contract}' declares no operation '{operation}'")]
    UnknownOperation {
        /// Contract name
        contract: String,
        /// Operation that was requested
        operation: String,
    },

    /// Two operations with the same name registered on one contract
    #[error("contract '{contract}' already declares operation '{operation}'")]
    DuplicateOperation {
        /// Contract name
        contract: String,
        /// Duplicated operation name
        operation: String,
    },

    /// Matcher or argument count differs from the declared parameter count
    #[error("'{operation}' takes {expected} parameter(s), got {actual}")]
    ArityMismatch {
        /// Operation name
        operation: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied matcher/argument count
        actual: usize,
    },

    /// Argument kind not admitted by the declared parameter kind
    #[error("'{operation}' parameter {index} expects {expected}, got {actual}")]
    KindMismatch {
        /// Operation name
        operation: String,
        /// Zero-based parameter index
        index: usize,
        /// Declared parameter kind
        expected: ValueKind,
        /// Kind of the actual argument
        actual: ValueKind,
    },

    /// Pattern matcher built from an invalid regular expression
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Parser diagnostic
        message: String,
    },

    /// Strict-mode call with no matching setup
    #[error("unexpected invocation: {operation}({args})")]
    UnexpectedInvocation {
        /// Operation name
        operation: String,
        /// Rendered argument values
        args: String,
    },

    /// A `verify*` condition was not met
    #[error("verification failed for '{operation}': expected {expected}, actual {actual}")]
    VerificationFailed {
        /// Operation name (or comma-joined names for `verify_all` and
        /// `verify_no_other_calls`)
        operation: String,
        /// Rendered expectation
        expected: String,
        /// Rendered observed state
        actual: String,
    },

    /// Fault injected by a `throws` behavior, propagated unmodified
    #[error(transparent)]
    Fault(#[from] Fault),
}
