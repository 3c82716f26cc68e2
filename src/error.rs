use std::path::PathBuf;
use thiserror::Error;

/// Failures are unrecoverable for the current run: a silently-wrong
/// evaluation result is worse than a hard stop, so nothing here is retried.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("input not found or unreadable: {}: {reason}", path.display())]
    InputNotFound { path: PathBuf, reason: String },

    #[error("unsupported dataset tag `{0}` (expected spider, sparc or cosql)")]
    UnsupportedDataset(String),

    #[error("unsupported evaluation type `{0}` (expected match or exec)")]
    UnsupportedEvalType(String),

    #[error("evaluator subprocess failed: {reason}")]
    Subprocess { reason: String },

    #[error("evaluator subprocess timed out after {timeout_secs}s")]
    SubprocessTimeout { timeout_secs: u64 },

    #[error("malformed report at line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    #[error("comparator input lengths differ: {contexts} contexts, {baseline} baseline interactions, {candidate} candidate interactions")]
    LengthMismatch {
        contexts: usize,
        baseline: usize,
        candidate: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
