//! Error taxonomy for the rewrite layer.
//!
//! Only [`RewriteError::Configuration`] and [`RewriteError::Metadata`] ever
//! reach the caller: a missing dialect or unknown table shape makes the
//! emitted SQL unsafe, so those abort the call. A failed count round trip is
//! absorbed by the interceptor (the page proceeds with an unknown total), and
//! malformed SQL in the comment-strip and footer paths degrades to a
//! pass-through of the original text instead of erroring.

use thiserror::Error;

/// Errors raised while rewriting a statement.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// No pagination dialect could be resolved from the configuration.
    /// Fatal: a wrong LIMIT/OFFSET syntax silently corrupts result sets,
    /// so no default dialect is ever assumed.
    #[error("no pagination dialect configured: {0}")]
    Configuration(String),

    /// Table metadata could not be resolved during soft-delete rewriting.
    /// Fatal: generating delete SQL against an unknown table shape is unsafe.
    #[error("unknown table metadata: {0}")]
    Metadata(String),

    /// The count round trip failed. Produced by [`ScalarExecutor`]
    /// implementations and recovered inside the interceptor; callers only
    /// see it when invoking an executor directly.
    ///
    /// [`ScalarExecutor`]: crate::executor::ScalarExecutor
    #[error("count query failed: {0}")]
    CountQuery(#[from] sqlx::Error),
}

/// Convenience alias used throughout the crate.
pub type RewriteResult<T> = Result<T, RewriteError>;
