//! Declaration dump for documentation and tooling
//!
//! Enumerates the candidate pool grouped by owning kind, without performing
//! any resolution and without touching mutable state. Exposed both as a
//! serializable structure and as a plain-text rendering.

use serde::Serialize;

use crate::registry::{Candidate, ParamKind, Registry};

/// Rendered signature data of one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateDecl {
    pub name: String,
    pub is_static: bool,
    /// Parameter kind names in order; the variadic tail carries a `...`
    /// suffix.
    pub params: Vec<String>,
    pub variadic: bool,
    pub returns: String,
}

/// All candidates owned by one kind, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindDeclarations {
    pub kind: String,
    pub parent: Option<String>,
    pub candidates: Vec<CandidateDecl>,
}

/// Enumerate every declared kind (in declaration order) with the
/// candidates it owns.
pub fn declarations(registry: &Registry) -> Vec<KindDeclarations> {
    let kinds = registry.kinds();
    kinds
        .ids()
        .map(|id| KindDeclarations {
            kind: kinds.name(id).to_string(),
            parent: kinds.parent(id).map(|p| kinds.name(p).to_string()),
            candidates: registry
                .candidates()
                .iter()
                .filter(|c| c.owner() == id)
                .map(|c| describe(registry, c))
                .collect(),
        })
        .collect()
}

/// Render the declaration dump as a human-readable listing: one block per
/// owning kind, one indented line per candidate signature.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for block in declarations(registry) {
        out.push_str("kind ");
        out.push_str(&block.kind);
        if let Some(parent) = &block.parent {
            out.push_str(" : ");
            out.push_str(parent);
        }
        out.push_str(" {\n");
        for c in &block.candidates {
            out.push_str("  ");
            if c.is_static {
                out.push_str("static ");
            }
            out.push_str(&c.name);
            out.push('(');
            out.push_str(&c.params.join(", "));
            out.push_str(") -> ");
            out.push_str(&c.returns);
            out.push('\n');
        }
        out.push_str("}\n");
    }
    out
}

fn describe(registry: &Registry, candidate: &Candidate) -> CandidateDecl {
    let params: Vec<String> = candidate
        .params()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut rendered = param_name(registry, *p);
            if candidate.is_variadic() && i == candidate.params().len() - 1 {
                rendered.push_str("...");
            }
            rendered
        })
        .collect();
    CandidateDecl {
        name: candidate.name().to_string(),
        is_static: candidate.is_static(),
        params,
        variadic: candidate.is_variadic(),
        returns: registry.kinds().name(candidate.returns()).to_string(),
    }
}

fn param_name(registry: &Registry, param: ParamKind) -> String {
    match param {
        ParamKind::Text => "text".to_string(),
        ParamKind::Int => "int".to_string(),
        ParamKind::Pattern(kind) => registry.kinds().name(kind).to_string(),
    }
}
