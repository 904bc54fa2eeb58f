use crate::asm::AsmError;

/// Failure to produce a program. Nothing is emitted on error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid number of inputs {0}: must be between 1 and 8")]
    InvalidArity(usize),

    #[error("constant tables for state width {width} are unusable: {reason}")]
    Tables { width: usize, reason: String },

    #[error("stack model lost track of `{0}`")]
    UntrackedValue(String),

    #[error("return register still holds `{pending}` when `{next}` is emitted")]
    ReentrantCall { pending: String, next: String },

    #[error("resume point `{0}` does not match a pending call")]
    UnmatchedResume(String),

    #[error(transparent)]
    Assembly(#[from] AsmError),
}

/// The only failure a generated program can produce at run time.
///
/// Carries no payload: the machine's abort discards everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeAbort {
    #[error("call selector matched no accepted entry signature")]
    SelectorMismatch,
}
