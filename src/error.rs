use thiserror::Error;

use crate::parse::ParseError;
use crate::{EvalError, ImportError, MembershipError};

/// Unified error type covering every way a run can fail.
///
/// Returned by [`Engine::prepare()`](crate::Engine::prepare),
/// [`Engine::run()`](crate::Engine::run) and [`Engine::execute()`](crate::Engine::execute).
/// The `Display` text is the message to show whoever started the run.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("this script produced no output")]
    EmptyOutput,
}

impl From<crate::ReferenceError> for ScriptError {
    fn from(e: crate::ReferenceError) -> Self {
        Self::Eval(e.into())
    }
}

impl From<crate::DomainError> for ScriptError {
    fn from(e: crate::DomainError) -> Self {
        Self::Eval(e.into())
    }
}
