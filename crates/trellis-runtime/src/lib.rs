//! Trellis runtime - pattern expression compiler
//!
//! This library compiles short textual expressions of chained, nested method
//! invocations (e.g. `outer(inner("x"), 5).more()`) into a single resolved
//! pattern value:
//! - Character-level finite-state parsing with an explicit frame stack
//! - Inline evaluation (call frames are the AST, reduced as soon as complete)
//! - Late-bound overload resolution against a registry of candidate callables

/// Trellis runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod compiler;
pub mod declarations;
pub mod error;
pub mod kind;
pub mod patterns;
pub mod registry;
pub mod value;

// Internal pipeline stages
mod parser;
mod resolver;

// Re-export commonly used types
pub use compiler::{CompilerOptions, PatternCompiler, DEFAULT_MAX_DEPTH};
pub use declarations::{CandidateDecl, KindDeclarations};
pub use error::{CompileError, InvocationError};
pub use kind::{KindId, KindTable};
pub use registry::{CallFn, Candidate, ParamKind, Registry, RegistryBuilder};
pub use value::{PatternValue, Value};
