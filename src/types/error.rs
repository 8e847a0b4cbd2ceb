use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("undefined reference '{name}'")]
    Undefined { name: String },

    #[error("recursive definition: {}", path.join(" -> "))]
    Recursive { path: Vec<String> },

    #[error("setup parameter '{name}' is not a valid {expected}")]
    KindMismatch { name: String, expected: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("{what} must be a whole number of zero or more, got {value}")]
    NotACount { what: &'static str, value: f64 },

    #[error("{what} is not a finite number")]
    NonFinite { what: &'static str },

    #[error("cannot take {requested} {what} from a deck of {available}")]
    Oversized {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("{what} of {value} is larger than the maximum of {max}")]
    TooLarge {
        what: &'static str,
        value: f64,
        max: usize,
    },

    #[error("cannot {what} from an empty deck")]
    EmptySource { what: &'static str },

    #[error("'{op}' needs at least one operand")]
    EmptyOperands { op: &'static str },

    #[error("limit must be at least 1")]
    ZeroLimit,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Failure while resolving an expression against a setup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("this script needs at least {min} participants, but {count} are eligible")]
    TooFew { count: usize, min: usize },

    #[error("this script allows at most {max} participants, but {count} are eligible")]
    TooMany { count: usize, max: usize },

    #[error("this script requires a moderator")]
    ModeratorRequired,
}

/// Failure reported by a [`FetchText`](crate::FetchText) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("too many imports: {count} listed, at most {max} allowed")]
    TooMany { count: usize, max: usize },

    #[error("could not fetch import '{address}': {source}")]
    Fetch { address: String, source: FetchError },

    #[error("could not read import '{address}': {source}")]
    Parse { address: String, source: ParseError },

    #[error("import '{address}' has imports of its own")]
    Nested { address: String },

    #[error("import '{address}' {} a moderator but the script {}",
        if *found { "requires" } else { "does not require" },
        if *expected { "does" } else { "does not" })]
    ModeratorMismatch {
        address: String,
        expected: bool,
        found: bool,
    },

    #[error("import '{address}': {source}")]
    Evaluate { address: String, source: EvalError },

    #[error("script still lists {count} unmerged imports")]
    Unmerged { count: usize },
}
