//! Compiler facade
//!
//! [`PatternCompiler`] ties the pipeline together: it owns the immutable
//! candidate registry, derives the top-level static pool once on first use,
//! and runs the parser with an executor that resolves and invokes each
//! completed call frame inline. One compilation is single-threaded and
//! synchronous; a compiler instance may be shared across threads because
//! every `compile` call owns its parser state and the pool never changes
//! after initialization.

use std::sync::{Arc, OnceLock};

use crate::declarations;
use crate::error::CompileError;
use crate::parser;
use crate::registry::Registry;
use crate::resolver::{self, ResolveError};
use crate::value::PatternValue;

/// Default cap on the nesting frame stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Compilation limits.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Maximum depth of the nesting frame stack; exceeding it is a syntax
    /// error. Guards against pathological input.
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiles pattern expressions against a fixed candidate registry.
pub struct PatternCompiler {
    registry: Arc<Registry>,
    options: CompilerOptions,
    /// Indices of the root-kind static candidates, derived once on first
    /// use and immutable afterwards.
    static_pool: OnceLock<Vec<usize>>,
}

impl PatternCompiler {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_options(registry, CompilerOptions::default())
    }

    pub fn with_options(registry: Arc<Registry>, options: CompilerOptions) -> Self {
        Self {
            registry,
            options,
            static_pool: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Compile `text` into a single resolved pattern value.
    ///
    /// Fails with [`CompileError::Syntax`] when the character stream
    /// violates the grammar, [`CompileError::Resolution`] when a completed
    /// call names no compatible candidate, and
    /// [`CompileError::Invocation`] when the selected candidate itself
    /// raises. No partial result is ever returned.
    pub fn compile(&self, text: &str) -> Result<PatternValue, CompileError> {
        let pool = self.static_pool();
        parser::parse_expression(text, self.options.max_depth, |frame| {
            resolver::resolve_and_invoke(&self.registry, pool, frame).map_err(|err| match err {
                ResolveError::UnknownSymbol { signature } => CompileError::Resolution {
                    signature,
                    text: text.to_string(),
                },
                ResolveError::Failed { method, source } => CompileError::Invocation {
                    method,
                    text: text.to_string(),
                    source,
                },
            })
        })
    }

    /// Like [`compile`](Self::compile), but catches every failure, logs a
    /// warning naming `display_name` and the offending text, and returns
    /// `None` instead of propagating.
    pub fn compile_or_null(&self, text: &str, display_name: &str) -> Option<PatternValue> {
        match self.compile(text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    place = display_name,
                    expression = text,
                    error = %err,
                    "error processing place"
                );
                None
            }
        }
    }

    /// Serializable enumeration of the registry, grouped by owning kind.
    pub fn declarations(&self) -> Vec<declarations::KindDeclarations> {
        declarations::declarations(&self.registry)
    }

    /// Human-readable declaration listing (diagnostic only).
    pub fn dump_declarations(&self) -> String {
        declarations::render(&self.registry)
    }

    fn static_pool(&self) -> &[usize] {
        self.static_pool
            .get_or_init(|| self.registry.derive_static_pool())
    }
}
