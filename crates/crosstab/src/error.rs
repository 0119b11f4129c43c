use crate::value::ValueKind;
use thiserror::Error as ThisError;

///
/// KeyError
///
/// Structural violations of the composite-key contract. These indicate a
/// programming error in the calling pipeline and are surfaced as explicit
/// failures, never swallowed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("unsupported key arity {arity}: expected 2..=5 components")]
    UnsupportedArity { arity: usize },

    #[error("component index {index} out of bounds for arity {arity}")]
    IndexOutOfBounds { index: usize, arity: usize },

    #[error("type mismatch at position {position}: expected {expected}, found {found}")]
    TypeMismatch {
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("cannot grow a key of arity {arity} past 5 components")]
    ArityExceeded { arity: usize },
}

///
/// ReportError
///
/// Failures of the report writer. Sparse data is never an error; only
/// structural misuse and sink I/O surface here.
///

#[derive(Debug, ThisError)]
pub enum ReportError {
    #[error("unsupported filter arity {arity}: expected 2..=5 dimensions")]
    UnsupportedArity { arity: usize },

    #[error("cross-product of {combinations} combinations exceeds the configured cap of {limit}")]
    TooManyCombinations { combinations: usize, limit: usize },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
