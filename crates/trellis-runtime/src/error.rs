//! Error types for expression compilation
//!
//! Three failure classes, all fatal to the current compile call:
//! syntax errors from the parser, resolution errors when no candidate
//! matches a completed call frame, and failures raised by the selected
//! callable itself. Every variant carries the offending source text so the
//! caller can see which expression broke.

use thiserror::Error;

/// Failure raised by a candidate callable during invocation.
///
/// Registered call closures return this to signal a domain error (e.g. an
/// argument value outside the callable's accepted range). It is propagated
/// to the top-level compile call unchanged, wrapped in
/// [`CompileError::Invocation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvocationError {
    message: String,
}

impl InvocationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error produced by [`PatternCompiler::compile`](crate::PatternCompiler::compile).
///
/// There is no partial success: either a single resolved value is returned
/// or the whole compilation fails with one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The character stream violates the grammar at some parser state.
    #[error("{message} in [{text}]")]
    Syntax { message: String, text: String },

    /// A completed call frame names no compatible candidate.
    /// `signature` is the attempted call rendered as `name(arg, ...)`.
    #[error("unknown symbol: {signature} in [{text}]")]
    Resolution { signature: String, text: String },

    /// The selected candidate raised a failure during execution.
    #[error("'{method}' failed in [{text}]: {source}")]
    Invocation {
        method: String,
        text: String,
        #[source]
        source: InvocationError,
    },
}

impl CompileError {
    /// The source expression this error was raised for.
    pub fn text(&self) -> &str {
        match self {
            CompileError::Syntax { text, .. }
            | CompileError::Resolution { text, .. }
            | CompileError::Invocation { text, .. } => text,
        }
    }
}
