//! End-to-end compiler tests
//!
//! Compile expressions against the standard pattern library and against a
//! purpose-built recording registry that logs every invocation, so
//! evaluation order and argument flow are observable.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use trellis_runtime::{
    patterns, CompileError, CompilerOptions, ParamKind, PatternCompiler, PatternValue, Registry,
    Value,
};

fn standard_compiler() -> PatternCompiler {
    PatternCompiler::new(Arc::new(patterns::standard_registry()))
}

/// Registry whose callables log themselves: free `a`/`inner`/`outer`/`f`
/// plus chainable `b`/`c`, all producing inert `P` values.
fn recording_registry(log: Arc<Mutex<Vec<String>>>) -> Registry {
    let mut b = Registry::builder();
    let root = b.kind("Root");
    let p = b.kind("P");
    b.root(root);

    let result = move || PatternValue::new(p, Arc::new(()));

    let l = log.clone();
    let r = result.clone();
    b.static_fn(root, "a", &[], false, p, move |_, _| {
        l.lock().unwrap().push("a".to_string());
        Ok(r())
    });
    for name in ["b", "c"] {
        let l = log.clone();
        let r = result.clone();
        b.method(p, name, &[], false, p, move |_, _| {
            l.lock().unwrap().push(name.to_string());
            Ok(r())
        });
    }

    let l = log.clone();
    let r = result.clone();
    b.static_fn(root, "inner", &[ParamKind::Text], false, p, move |_, args| {
        l.lock().unwrap().push(format!("inner({:?})", args[0].as_text().unwrap()));
        Ok(r())
    });
    let l = log.clone();
    let r = result.clone();
    b.static_fn(
        root,
        "outer",
        &[ParamKind::Pattern(p), ParamKind::Int],
        false,
        p,
        move |_, args| {
            let shape: Vec<&str> = args.iter().map(Value::type_name).collect();
            l.lock()
                .unwrap()
                .push(format!("outer[{}] n={}", shape.join(","), args[1].as_int().unwrap()));
            Ok(r())
        },
    );

    let l = log.clone();
    let r = result.clone();
    b.static_fn(
        root,
        "f",
        &[ParamKind::Text, ParamKind::Text, ParamKind::Text],
        true,
        p,
        move |_, args| {
            let tail: Vec<String> = args[2]
                .as_seq()
                .unwrap()
                .iter()
                .map(|v| v.as_text().unwrap().to_string())
                .collect();
            l.lock().unwrap().push(format!("f tail={tail:?}"));
            Ok(r())
        },
    );

    // Overloads: same name, distinct parameter kinds.
    let l = log.clone();
    let r = result.clone();
    b.static_fn(root, "g", &[ParamKind::Text], false, p, move |_, _| {
        l.lock().unwrap().push("g:text".to_string());
        Ok(r())
    });
    let l = log.clone();
    let r = result.clone();
    b.static_fn(root, "g", &[ParamKind::Int], false, p, move |_, _| {
        l.lock().unwrap().push("g:int".to_string());
        Ok(r())
    });

    // Two structurally identical candidates: the first declared must win.
    let l = log.clone();
    let r = result.clone();
    b.static_fn(root, "h", &[], false, p, move |_, _| {
        l.lock().unwrap().push("h:first".to_string());
        Ok(r())
    });
    let l = log;
    let r = result;
    b.static_fn(root, "h", &[], false, p, move |_, _| {
        l.lock().unwrap().push("h:second".to_string());
        Ok(r())
    });

    b.build()
}

fn recording_compiler() -> (PatternCompiler, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let compiler = PatternCompiler::new(Arc::new(recording_registry(log.clone())));
    (compiler, log)
}

fn rendered(compiler: &PatternCompiler, text: &str) -> String {
    let value = compiler.compile(text).unwrap();
    patterns::render(&value).unwrap()
}

// ============================================================================
// Resolution and evaluation order
// ============================================================================

#[test]
fn test_zero_arg_call_resolves() {
    let compiler = standard_compiler();
    assert_eq!(rendered(&compiler, "string()"), "string()");
}

#[test]
fn test_unknown_zero_arg_call_fails() {
    let compiler = standard_compiler();
    match compiler.compile("nope()") {
        Err(CompileError::Resolution { signature, text }) => {
            assert_eq!(signature, "nope()");
            assert_eq!(text, "nope()");
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[test]
fn test_chain_evaluates_left_to_right() {
    let (compiler, log) = recording_compiler();
    compiler.compile("a().b().c()").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_nested_argument_evaluates_before_outer() {
    let (compiler, log) = recording_compiler();
    compiler.compile(r#"outer(inner("x"), 5)"#).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![r#"inner("x")"#.to_string(), "outer[pattern,int] n=5".to_string()]
    );
}

#[test]
fn test_overload_picked_by_argument_kind() {
    let (compiler, log) = recording_compiler();
    compiler.compile(r#"g("x")"#).unwrap();
    compiler.compile("g(5)").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["g:text", "g:int"]);
}

#[test]
fn test_first_declared_candidate_wins() {
    let (compiler, log) = recording_compiler();
    compiler.compile("h()").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["h:first"]);
}

#[test]
fn test_arity_mismatch_is_resolution_error() {
    let (compiler, _) = recording_compiler();
    assert!(matches!(
        compiler.compile(r#"g("x", "y")"#),
        Err(CompileError::Resolution { .. })
    ));
}

#[test]
fn test_resolution_error_renders_arguments() {
    let (compiler, _) = recording_compiler();
    match compiler.compile(r#"missing("x", 5)"#) {
        Err(CompileError::Resolution { signature, .. }) => {
            assert_eq!(signature, "missing(x, 5)");
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
}

// ============================================================================
// Variadic packing
// ============================================================================

#[test]
fn test_variadic_packs_trailing_arguments() {
    let (compiler, log) = recording_compiler();
    compiler.compile(r#"f("x", "y", "z", "w")"#).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![r#"f tail=["z", "w"]"#]);
}

#[test]
fn test_variadic_accepts_fixed_prefix_only() {
    let (compiler, log) = recording_compiler();
    compiler.compile(r#"f("x", "y")"#).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["f tail=[]"]);
}

#[test]
fn test_variadic_below_fixed_prefix_fails() {
    let (compiler, _) = recording_compiler();
    assert!(matches!(
        compiler.compile(r#"f("x")"#),
        Err(CompileError::Resolution { .. })
    ));
}

#[test]
fn test_heterogeneous_trailing_arguments_each_checked() {
    // anyOf's element kind is ObjectPattern; a StringPattern and an
    // ObjectPattern are both individually compatible.
    let compiler = standard_compiler();
    assert_eq!(
        rendered(&compiler, "anyOf(string(), object())"),
        "anyOf(string(), object())"
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_quoted_literal_is_opaque_to_structure() {
    let compiler = standard_compiler();
    assert_eq!(
        rendered(&compiler, r#"string().contains("a,b(c)")"#),
        r#"string().contains("a,b(c)")"#
    );
}

#[test]
fn test_integer_literal() {
    let compiler = standard_compiler();
    assert_eq!(
        rendered(&compiler, "string().withLength(4)"),
        "string().withLength(4)"
    );
}

// ============================================================================
// Bound calls and kind polymorphism
// ============================================================================

#[test]
fn test_inherited_method_on_subkind_target() {
    // `and` is declared on ObjectPattern; a StringPattern target exposes it
    // through its full capability set.
    let compiler = standard_compiler();
    assert_eq!(
        rendered(&compiler, r#"string().and(not(object()))"#),
        "string().and(not(object()))"
    );
}

#[test]
fn test_method_unknown_on_target_kind() {
    let compiler = standard_compiler();
    assert!(matches!(
        compiler.compile(r#"object().contains("x")"#),
        Err(CompileError::Resolution { .. })
    ));
}

#[test]
fn test_chained_conditions_compose() {
    let compiler = standard_compiler();
    let value = compiler
        .compile(r#"string().startsWith("a").endsWith("d")"#)
        .unwrap();
    assert_eq!(patterns::accepts(&value, "abcd"), Some(true));
    assert_eq!(patterns::accepts(&value, "abcx"), Some(false));
}

// ============================================================================
// Failure propagation
// ============================================================================

#[test]
fn test_invocation_failure_propagates() {
    let compiler = standard_compiler();
    match compiler.compile("string().oneOf()") {
        Err(CompileError::Invocation { method, source, .. }) => {
            assert_eq!(method, "oneOf");
            assert_eq!(source.message(), "oneOf: at least one option required");
        }
        other => panic!("expected invocation error, got {other:?}"),
    }
}

#[rstest]
#[case("")]
#[case("foo(")]
#[case("foo(,)")]
#[case("1 + 2")]
#[case("string())")]
#[case("string().")]
#[case(r#"foo("unterminated"#)]
#[case("foo bar")]
#[case("not(string()")]
fn test_malformed_input_is_syntax_error(#[case] text: &str) {
    let compiler = standard_compiler();
    match compiler.compile(text) {
        Err(CompileError::Syntax { text: reported, .. }) => assert_eq!(reported, text),
        other => panic!("expected syntax error for {text:?}, got {other:?}"),
    }
}

#[test]
fn test_depth_guard_is_configurable() {
    let compiler = PatternCompiler::with_options(
        Arc::new(patterns::standard_registry()),
        CompilerOptions { max_depth: 2 },
    );
    let expr = format!("{}string(){}", "not(".repeat(4), ")".repeat(4));
    assert!(matches!(
        compiler.compile(&expr),
        Err(CompileError::Syntax { .. })
    ));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_recompilation_is_idempotent() {
    let compiler = standard_compiler();
    let text = r#"string().contains("x").withLength(3)"#;
    let first = compiler.compile(text).unwrap();
    let second = compiler.compile(text).unwrap();
    assert_eq!(patterns::render(&first), patterns::render(&second));
}

#[test]
fn test_compilation_does_not_mutate_the_pool() {
    let compiler = standard_compiler();
    let before = compiler.declarations();
    compiler.compile("string().oneOf(\"a\", \"b\")").unwrap();
    let _ = compiler.compile("nope()");
    assert_eq!(compiler.declarations(), before);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_compile_never_panics(text in "\\PC{0,60}") {
        let compiler = standard_compiler();
        let _ = compiler.compile(&text);
    }

    #[test]
    fn prop_nesting_within_the_limit_compiles(depth in 1usize..40) {
        let compiler = standard_compiler();
        let expr = format!("{}string(){}", "not(".repeat(depth), ")".repeat(depth));
        compiler.compile(&expr).unwrap();
    }

    #[test]
    fn prop_quoted_content_round_trips(content in "[a-z,() .]{0,20}") {
        let compiler = standard_compiler();
        let value = compiler
            .compile(&format!("string().contains(\"{content}\")"))
            .unwrap();
        prop_assert_eq!(patterns::accepts(&value, &format!("x{content}y")), Some(true));
    }
}
