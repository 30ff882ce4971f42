//! Candidate callable registry
//!
//! Resolution is driven by explicit declarations rather than runtime
//! reflection: each participating value kind registers its callable members
//! (name, parameter kinds, variadic flag, and a closure performing the
//! actual call) through [`RegistryBuilder`]. Candidates are stored in
//! declaration order because name collisions resolve to the first
//! structurally compatible match, not a best-fit ranking.
//!
//! Once built, a [`Registry`] is immutable for the lifetime of the
//! compiler instances that share it.

use std::sync::Arc;

use crate::error::InvocationError;
use crate::kind::{KindId, KindTable};
use crate::value::{PatternValue, Value};

/// The closure performing a candidate's actual call: the resolved target
/// (absent for free/static calls) and the final, possibly variadic-packed,
/// argument list.
pub type CallFn =
    Arc<dyn Fn(Option<&PatternValue>, &[Value]) -> Result<PatternValue, InvocationError> + Send + Sync>;

/// Declared kind of a single candidate parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Literal text
    Text,
    /// Literal integer
    Int,
    /// A previously resolved pattern value of the given kind (or any
    /// descendant kind)
    Pattern(KindId),
}

/// One registered callable member.
pub struct Candidate {
    name: String,
    owner: KindId,
    params: Vec<ParamKind>,
    variadic: bool,
    is_static: bool,
    returns: KindId,
    call: CallFn,
}

impl Candidate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind this candidate belongs to: a root kind for static/free
    /// candidates, the receiver kind for instance candidates.
    pub fn owner(&self) -> KindId {
        self.owner
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// True if the last declared parameter accepts zero or more trailing
    /// arguments, packed into one [`Value::Seq`] before invocation.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// True for free-style candidates seeded into the top-level pool from
    /// a root kind.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn returns(&self) -> KindId {
        self.returns
    }

    pub(crate) fn call_fn(&self) -> &CallFn {
        &self.call
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Immutable pool of candidate callables plus the kind table they are
/// declared against.
#[derive(Debug)]
pub struct Registry {
    kinds: KindTable,
    candidates: Vec<Candidate>,
    roots: Vec<KindId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Root kinds whose static candidates seed the top-level pool.
    pub fn roots(&self) -> &[KindId] {
        &self.roots
    }

    /// Indices of the static candidates owned by a root kind, in
    /// declaration order. Derived once per compiler instance.
    pub(crate) fn derive_static_pool(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_static && self.roots.contains(&c.owner))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Render a value for diagnostics (resolution-error argument lists).
    pub fn display_value(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => s.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Pattern(p) => format!("<{}>", self.kinds.name(p.kind())),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.display_value(v)).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// Builder for [`Registry`]. Kinds must be declared before the candidates
/// that mention them.
#[derive(Default)]
pub struct RegistryBuilder {
    kinds: KindTable,
    candidates: Vec<Candidate>,
    roots: Vec<KindId>,
}

impl RegistryBuilder {
    /// Declare a kind with no parent.
    pub fn kind(&mut self, name: &str) -> KindId {
        self.kinds.declare(name, None)
    }

    /// Declare a kind whose instances also satisfy `parent` in
    /// compatibility checks.
    pub fn kind_with_parent(&mut self, name: &str, parent: KindId) -> KindId {
        self.kinds.declare(name, Some(parent))
    }

    /// Mark a kind as a root: its static candidates seed the top-level
    /// candidate pool.
    pub fn root(&mut self, kind: KindId) -> &mut Self {
        if !self.roots.contains(&kind) {
            self.roots.push(kind);
        }
        self
    }

    /// Register a static/free candidate owned by `owner`.
    pub fn static_fn<F>(
        &mut self,
        owner: KindId,
        name: &str,
        params: &[ParamKind],
        variadic: bool,
        returns: KindId,
        call: F,
    ) -> &mut Self
    where
        F: Fn(Option<&PatternValue>, &[Value]) -> Result<PatternValue, InvocationError>
            + Send
            + Sync
            + 'static,
    {
        self.push(owner, name, params, variadic, true, returns, Arc::new(call))
    }

    /// Register an instance candidate invoked against values of `owner`
    /// (or any descendant kind).
    pub fn method<F>(
        &mut self,
        owner: KindId,
        name: &str,
        params: &[ParamKind],
        variadic: bool,
        returns: KindId,
        call: F,
    ) -> &mut Self
    where
        F: Fn(Option<&PatternValue>, &[Value]) -> Result<PatternValue, InvocationError>
            + Send
            + Sync
            + 'static,
    {
        self.push(owner, name, params, variadic, false, returns, Arc::new(call))
    }

    fn push(
        &mut self,
        owner: KindId,
        name: &str,
        params: &[ParamKind],
        variadic: bool,
        is_static: bool,
        returns: KindId,
        call: CallFn,
    ) -> &mut Self {
        assert!(
            !variadic || !params.is_empty(),
            "variadic candidate '{name}' needs at least one declared parameter"
        );
        self.candidates.push(Candidate {
            name: name.to_string(),
            owner,
            params: params.to_vec(),
            variadic,
            is_static,
            returns,
            call,
        });
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            kinds: self.kinds,
            candidates: self.candidates,
            roots: self.roots,
        }
    }
}
