use std::ops::ControlFlow;

use coffee2closure_rs::{parse, traverse, Coffee2Closure, Error, FixOptions, FixResult};
use oxc_span::SourceType;
use pretty_assertions::assert_eq;

fn no_header() -> FixOptions {
    FixOptions { add_generated_by_header: false, ..FixOptions::default() }
}

fn run(input: &str) -> FixResult {
    let out = Coffee2Closure::default().fix(input, no_header()).unwrap();

    println!("==== INPUT ====\n{input}\n==== OUTPUT ====\n{}\n", out.code);
    out
}

const INDEX_OF: &str = r#"var __indexOf = [].indexOf || function(item) { for (var i = 0, l = this.length; i < l; i++) { if (i in this && this[i] === item) return i; } return -1; };

if (__indexOf.call(list, x) >= 0) {
  found = true;
}
"#;

#[test]
fn index_of_becomes_goog_array_call_with_require() {
    let out = run(INDEX_OF);
    assert_eq!(out.code, "goog.require('goog.array');\nif (goog.array.indexOf(list, x) >= 0) {\n  found = true;\n}\n");
    assert!(out.requires_goog_array);
    assert!(out.modified);
}

#[test]
fn slice_becomes_goog_array_slice() {
    let input = r#"var __slice = [].slice;

function f() {
  var args = 1 <= arguments.length ? __slice.call(arguments, 0) : [];
  return args;
}
"#;
    let expected = "goog.require('goog.array');\nfunction f() {\n  var args = 1 <= arguments.length ? goog.array.slice(arguments, 0) : [];\n  return args;\n}\n";
    assert_eq!(run(input).code, expected);
}

#[test]
fn bind_becomes_goog_bind_without_require() {
    let input = r#"var __bind = function(fn, me){ return function(){ return fn.apply(me, arguments); }; };

this.onClick = __bind(this.onClick, this);
"#;
    let out = run(input);
    assert_eq!(out.code, "this.onClick = goog.bind(this.onClick, this);\n");
    assert!(!out.requires_goog_array);
}

#[test]
fn multi_line_helper_declaration_is_removed_entirely() {
    let input = "var __slice = [].slice,\n  __bind = function() {};\nfoo();\n";
    assert_eq!(run(input).code, "foo();\n");
}

#[test]
fn missing_separator_on_shared_first_line_is_fatal() {
    let input = "var Foo = [\n  1], __bind = function() {};\n";
    let err = Coffee2Closure::default().fix(input, no_header()).unwrap_err();
    match err {
        Error::MalformedDeclaration { line, found } => {
            assert_eq!(line, 1);
            assert_eq!(found, "[");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_goes_above_the_require_line() {
    let out = Coffee2Closure::default().fix(INDEX_OF, FixOptions::default()).unwrap();
    let mut lines = out.code.lines();
    assert_eq!(
        lines.next().unwrap(),
        format!("// Generated by coffee2closure-rs {}", env!("CARGO_PKG_VERSION"))
    );
    assert_eq!(lines.next().unwrap(), "goog.require('goog.array');");
}

#[test]
fn plain_code_is_reproduced_exactly() {
    let input = "var a = 1;\nif (a) {\n  b(a, 'x y'); // note\n}\n";
    assert_eq!(run(input).code, input);

    let with_header = Coffee2Closure::default().fix(input, FixOptions::default()).unwrap();
    let (banner, rest) = with_header.code.split_once('\n').unwrap();
    assert!(banner.starts_with("// Generated by coffee2closure-rs"));
    assert_eq!(rest, input);
}

#[test]
fn commonjs_modules_are_returned_unchanged() {
    let input = "var __slice = [].slice;\n\nexports.f = function() {\n  return __slice.call(arguments, 0);\n};\n";
    let out = Coffee2Closure::default().fix(input, FixOptions::default()).unwrap();
    assert_eq!(out.code, input);
    assert!(!out.modified);
}

#[test]
fn require_flag_does_not_leak_between_calls() {
    let fixer = Coffee2Closure::default();
    let first = fixer.fix(INDEX_OF, no_header()).unwrap();
    assert!(first.requires_goog_array);

    let second = fixer.fix("a(b);\n", no_header()).unwrap();
    assert!(!second.requires_goog_array);
    assert_eq!(second.code, "a(b);\n");
}

#[test]
fn fixing_is_deterministic() {
    let fixer = Coffee2Closure::default();
    let a = fixer.fix(INDEX_OF, FixOptions::default()).unwrap();
    let b = fixer.fix(INDEX_OF, FixOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(coffee2closure_rs::fix(INDEX_OF, &FixOptions::default()).unwrap(), a.code);
}

#[test]
fn traverse_finds_helper_declarations() {
    let parsed = parse(INDEX_OF, SourceType::cjs()).unwrap();
    let mut declarations = 0;
    let completed = traverse(&parsed.tree, &mut |node| {
        if node.declared_names().any(|name| name == "__indexOf") {
            declarations += 1;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    assert!(!completed);
    assert_eq!(declarations, 1);
}

#[test]
fn explicit_module_source_type_is_honoured() {
    let input = "import { x } from 'y';\n\nx(1);\n";
    let opts = FixOptions { source_type: Some(SourceType::mjs()), ..no_header() };
    let out = Coffee2Closure::default().fix(input, opts).unwrap();
    assert_eq!(out.code, "import { x } from 'y';\nx(1);\n");
}
