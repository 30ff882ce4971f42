//! Standard pattern library
//!
//! A concrete registry of string/object pattern callables, the out-of-box
//! vocabulary for the compiler: `string()`, `object()`, `anyOf(...)`,
//! `not(...)` at the top level, chainable conditions (`contains`,
//! `startsWith`, `endsWith`, `oneOf`, `withLength`) on string patterns and
//! `and`/`andNot` combinators on any pattern. Compiled patterns are real
//! predicates over input strings, see [`accepts`].

use std::sync::Arc;

use crate::error::InvocationError;
use crate::kind::KindId;
use crate::registry::{ParamKind, Registry};
use crate::value::{PatternValue, Value};

/// Predicate tree carried as the payload of every standard pattern value.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    AnyObject,
    AnyString,
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    OneOf(Vec<String>),
    WithLength(usize),
    /// Conjunction: a base pattern plus chained conditions, in chain order.
    All(Vec<Matcher>),
    /// Disjunction (`anyOf`).
    Any(Vec<Matcher>),
    Not(Box<Matcher>),
}

impl Matcher {
    /// Test an input string against this predicate.
    pub fn accepts(&self, input: &str) -> bool {
        match self {
            Matcher::AnyObject | Matcher::AnyString => true,
            Matcher::Contains(s) => input.contains(s.as_str()),
            Matcher::StartsWith(s) => input.starts_with(s.as_str()),
            Matcher::EndsWith(s) => input.ends_with(s.as_str()),
            Matcher::OneOf(options) => options.iter().any(|o| o == input),
            Matcher::WithLength(n) => input.chars().count() == *n,
            Matcher::All(arms) => arms.iter().all(|m| m.accepts(input)),
            Matcher::Any(arms) => arms.iter().any(|m| m.accepts(input)),
            Matcher::Not(inner) => !inner.accepts(input),
        }
    }

    /// Canonical textual form, structurally equal matchers render equal.
    pub fn render(&self) -> String {
        match self {
            Matcher::AnyObject => "object()".to_string(),
            Matcher::AnyString => "string()".to_string(),
            Matcher::Contains(s) => format!("contains({s:?})"),
            Matcher::StartsWith(s) => format!("startsWith({s:?})"),
            Matcher::EndsWith(s) => format!("endsWith({s:?})"),
            Matcher::OneOf(options) => {
                let parts: Vec<String> = options.iter().map(|o| format!("{o:?}")).collect();
                format!("oneOf({})", parts.join(", "))
            }
            Matcher::WithLength(n) => format!("withLength({n})"),
            Matcher::All(arms) => {
                let parts: Vec<String> = arms
                    .iter()
                    .enumerate()
                    .map(|(i, m)| match m {
                        // Composite arms chained onto a base pattern read
                        // as `and(...)` calls.
                        Matcher::All(_) | Matcher::Any(_) | Matcher::Not(_) if i > 0 => {
                            format!("and({})", m.render())
                        }
                        _ => m.render(),
                    })
                    .collect();
                parts.join(".")
            }
            Matcher::Any(arms) => {
                let parts: Vec<String> = arms.iter().map(Matcher::render).collect();
                format!("anyOf({})", parts.join(", "))
            }
            Matcher::Not(inner) => format!("not({})", inner.render()),
        }
    }
}

/// Test `input` against a compiled standard pattern. `None` if the value
/// was not produced by this library.
pub fn accepts(pattern: &PatternValue, input: &str) -> Option<bool> {
    pattern.downcast_ref::<Matcher>().map(|m| m.accepts(input))
}

/// Canonical form of a compiled standard pattern. `None` if the value was
/// not produced by this library.
pub fn render(pattern: &PatternValue) -> Option<String> {
    pattern.downcast_ref::<Matcher>().map(Matcher::render)
}

fn wrap(kind: KindId, matcher: Matcher) -> PatternValue {
    PatternValue::new(kind, Arc::new(matcher))
}

/// Append a chained condition to a base matcher, flattening conjunctions.
fn chain(base: Matcher, condition: Matcher) -> Matcher {
    match base {
        Matcher::All(mut arms) => {
            arms.push(condition);
            Matcher::All(arms)
        }
        other => Matcher::All(vec![other, condition]),
    }
}

fn matcher_of(pattern: &PatternValue) -> Result<Matcher, InvocationError> {
    pattern
        .downcast_ref::<Matcher>()
        .cloned()
        .ok_or_else(|| InvocationError::new("foreign pattern value"))
}

fn target_matcher(target: Option<&PatternValue>) -> Result<Matcher, InvocationError> {
    let Some(target) = target else {
        return Err(InvocationError::new("missing call target"));
    };
    matcher_of(target)
}

fn text_arg(args: &[Value], index: usize) -> Result<String, InvocationError> {
    args.get(index)
        .and_then(Value::as_text)
        .map(str::to_string)
        .ok_or_else(|| InvocationError::new(format!("text argument expected at position {index}")))
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, InvocationError> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| InvocationError::new(format!("int argument expected at position {index}")))
}

fn seq_texts(args: &[Value], index: usize) -> Result<Vec<String>, InvocationError> {
    let items = args
        .get(index)
        .and_then(Value::as_seq)
        .ok_or_else(|| InvocationError::new(format!("packed arguments expected at position {index}")))?;
    items
        .iter()
        .map(|v| {
            v.as_text()
                .map(str::to_string)
                .ok_or_else(|| InvocationError::new("text argument expected"))
        })
        .collect()
}

fn seq_matchers(args: &[Value], index: usize) -> Result<Vec<Matcher>, InvocationError> {
    let items = args
        .get(index)
        .and_then(Value::as_seq)
        .ok_or_else(|| InvocationError::new(format!("packed arguments expected at position {index}")))?;
    items
        .iter()
        .map(|v| {
            v.as_pattern()
                .ok_or_else(|| InvocationError::new("pattern argument expected"))
                .and_then(matcher_of)
        })
        .collect()
}

fn pattern_arg(args: &[Value], index: usize) -> Result<Matcher, InvocationError> {
    args.get(index)
        .and_then(Value::as_pattern)
        .ok_or_else(|| {
            InvocationError::new(format!("pattern argument expected at position {index}"))
        })
        .and_then(matcher_of)
}

/// Build the standard pattern registry: `StandardPatterns` is the root
/// kind seeding the free-call pool, `StringPattern` is a child of
/// `ObjectPattern`.
pub fn standard_registry() -> Registry {
    let mut b = Registry::builder();
    let root = b.kind("StandardPatterns");
    let object = b.kind("ObjectPattern");
    let string = b.kind_with_parent("StringPattern", object);
    b.root(root);

    b.static_fn(root, "string", &[], false, string, move |_, _| {
        Ok(wrap(string, Matcher::AnyString))
    });
    b.static_fn(root, "object", &[], false, object, move |_, _| {
        Ok(wrap(object, Matcher::AnyObject))
    });
    b.static_fn(
        root,
        "anyOf",
        &[ParamKind::Pattern(object)],
        true,
        object,
        move |_, args| {
            let arms = seq_matchers(args, 0)?;
            if arms.is_empty() {
                return Err(InvocationError::new("anyOf: at least one pattern required"));
            }
            Ok(wrap(object, Matcher::Any(arms)))
        },
    );
    b.static_fn(
        root,
        "not",
        &[ParamKind::Pattern(object)],
        false,
        object,
        move |_, args| {
            let inner = pattern_arg(args, 0)?;
            Ok(wrap(object, Matcher::Not(Box::new(inner))))
        },
    );

    b.method(
        object,
        "and",
        &[ParamKind::Pattern(object)],
        false,
        object,
        move |target, args| {
            let base = target_matcher(target)?;
            let other = pattern_arg(args, 0)?;
            Ok(wrap(object, chain(base, other)))
        },
    );
    b.method(
        object,
        "andNot",
        &[ParamKind::Pattern(object)],
        false,
        object,
        move |target, args| {
            let base = target_matcher(target)?;
            let other = pattern_arg(args, 0)?;
            Ok(wrap(object, chain(base, Matcher::Not(Box::new(other)))))
        },
    );

    b.method(
        string,
        "contains",
        &[ParamKind::Text],
        false,
        string,
        move |target, args| {
            let base = target_matcher(target)?;
            Ok(wrap(string, chain(base, Matcher::Contains(text_arg(args, 0)?))))
        },
    );
    b.method(
        string,
        "startsWith",
        &[ParamKind::Text],
        false,
        string,
        move |target, args| {
            let base = target_matcher(target)?;
            Ok(wrap(
                string,
                chain(base, Matcher::StartsWith(text_arg(args, 0)?)),
            ))
        },
    );
    b.method(
        string,
        "endsWith",
        &[ParamKind::Text],
        false,
        string,
        move |target, args| {
            let base = target_matcher(target)?;
            Ok(wrap(string, chain(base, Matcher::EndsWith(text_arg(args, 0)?))))
        },
    );
    b.method(
        string,
        "oneOf",
        &[ParamKind::Text],
        true,
        string,
        move |target, args| {
            let base = target_matcher(target)?;
            let options = seq_texts(args, 0)?;
            if options.is_empty() {
                return Err(InvocationError::new("oneOf: at least one option required"));
            }
            Ok(wrap(string, chain(base, Matcher::OneOf(options))))
        },
    );
    b.method(
        string,
        "withLength",
        &[ParamKind::Int],
        false,
        string,
        move |target, args| {
            let base = target_matcher(target)?;
            let length = int_arg(args, 0)?;
            if length < 0 {
                return Err(InvocationError::new(format!(
                    "withLength: negative length {length}"
                )));
            }
            Ok(wrap(
                string,
                chain(base, Matcher::WithLength(length as usize)),
            ))
        },
    );

    b.build()
}
