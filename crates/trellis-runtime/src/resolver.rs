//! Candidate resolution and invocation
//!
//! Given a completed call frame, pick exactly one candidate from the pool
//! and invoke it. The pool is the precomputed root-kind static pool for
//! free calls, or the target kind's full capability set (own and inherited
//! members) for bound calls. Candidates are tried in declaration order and
//! the first structurally compatible match wins; there is no cost-based
//! ranking.

use crate::error::InvocationError;
use crate::kind::KindTable;
use crate::parser::Frame;
use crate::registry::{Candidate, ParamKind, Registry};
use crate::value::{PatternValue, Value};

/// Failure of one resolution/invocation step, before the source text is
/// attached by the compiler.
#[derive(Debug)]
pub(crate) enum ResolveError {
    UnknownSymbol { signature: String },
    Failed { method: String, source: InvocationError },
}

pub(crate) fn resolve_and_invoke(
    registry: &Registry,
    static_pool: &[usize],
    frame: &Frame,
) -> Result<PatternValue, ResolveError> {
    let candidate = match &frame.target {
        None => static_pool
            .iter()
            .map(|&idx| &registry.candidates()[idx])
            .find(|c| matches(registry.kinds(), c, &frame.method_name, &frame.params)),
        Some(target) => registry
            .candidates()
            .iter()
            .filter(|c| !c.is_static())
            .filter(|c| registry.kinds().is_instance_of(target.kind(), c.owner()))
            .find(|c| matches(registry.kinds(), c, &frame.method_name, &frame.params)),
    };

    let Some(candidate) = candidate else {
        return Err(ResolveError::UnknownSymbol {
            signature: render_call(registry, frame),
        });
    };

    let args = if candidate.is_variadic() {
        pack_variadic(candidate, &frame.params)
    } else {
        frame.params.clone()
    };

    (candidate.call_fn())(frame.target.as_ref(), &args).map_err(|source| ResolveError::Failed {
        method: frame.method_name.clone(),
        source,
    })
}

/// Structural compatibility of one candidate with the supplied arguments:
/// exact name, arity (exact, or at least the fixed prefix when variadic),
/// and per-index kind compatibility, with every index at or beyond the
/// variadic position checked against the variadic element kind.
fn matches(kinds: &KindTable, candidate: &Candidate, name: &str, args: &[Value]) -> bool {
    if candidate.name() != name {
        return false;
    }
    let declared = candidate.params().len();
    if candidate.is_variadic() {
        if args.len() + 1 < declared {
            return false;
        }
    } else if args.len() != declared {
        return false;
    }
    args.iter().enumerate().all(|(i, arg)| {
        let expected = if candidate.is_variadic() && i >= declared - 1 {
            candidate.params()[declared - 1]
        } else {
            candidate.params()[i]
        };
        param_accepts(kinds, expected, arg)
    })
}

fn param_accepts(kinds: &KindTable, expected: ParamKind, arg: &Value) -> bool {
    match (expected, arg) {
        (ParamKind::Text, Value::Text(_)) => true,
        (ParamKind::Int, Value::Int(_)) => true,
        (ParamKind::Pattern(kind), Value::Pattern(p)) => kinds.is_instance_of(p.kind(), kind),
        _ => false,
    }
}

/// Collect the trailing arguments beyond the fixed prefix into a single
/// sequence value. The trailing run may be empty.
fn pack_variadic(candidate: &Candidate, args: &[Value]) -> Vec<Value> {
    let fixed = candidate.params().len() - 1;
    let mut packed: Vec<Value> = args[..fixed].to_vec();
    packed.push(Value::seq(args[fixed..].to_vec()));
    packed
}

fn render_call(registry: &Registry, frame: &Frame) -> String {
    let args: Vec<String> = frame
        .params
        .iter()
        .map(|v| registry.display_value(v))
        .collect();
    format!("{}({})", frame.method_name, args.join(", "))
}
