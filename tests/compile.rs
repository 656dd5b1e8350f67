//! End-to-end compilation scenarios, run against the bundled stdlib.

use std::path::{Path, PathBuf};

use flowpatch::ast::Expr;
use flowpatch::error::Error;
use flowpatch::parser::{parse_expr, parse_program};
use pretty_assertions::assert_eq;

fn stdlib_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("stdlib")
}

fn compile(source: &str) -> String {
    flowpatch::expand::compile(source, None, &stdlib_root()).unwrap_or_else(|e| panic!("compile failed: {e}"))
}

fn parse_one(line: &str) -> Expr {
    let mut cursor = flowpatch::lexer::Cursor::new(0, line);
    parse_expr(&mut cursor).unwrap_or_else(|| panic!("failed to parse {line:?}"))
}

#[test]
fn minimal_assignment() {
    let out = compile("x = 1");
    assert_eq!(
        out,
        "#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X msg 0 0 1;\r\n#X connect 0 0 1 0;\r\n"
    );
}

#[test]
fn assign_and_self_connect() {
    let out = compile("x = `float`\nx -> x");
    assert_eq!(
        out,
        "#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X obj 0 0 float;\r\n#X connect 1 0 1 0;\r\n"
    );
}

#[test]
fn operator_wires_operands_into_a_fresh_node_via_the_stdlib() {
    let out = compile("a = `r one`\nb = `r two`\ny = a + b");
    // Node 1 is `a`, node 2 is `b`, node 3 is the `+` object created by `op`.
    assert!(out.contains("#X obj 0 0 r one;\r\n"));
    assert!(out.contains("#X obj 0 0 r two;\r\n"));
    assert!(out.contains("#X obj 0 0 +;\r\n"));
    assert!(out.contains("#X connect 1 0 3 0;\r\n"));
    assert!(out.contains("#X connect 2 0 3 1;\r\n"));
}

#[test]
fn signal_operator_selects_op_underscore() {
    let out = compile("a = `r one`\nb = `r two`\ny = a +~ b");
    // Both op and op_ are structurally identical in the bundled stdlib, so
    // this just asserts the call succeeds and still produces a `+~` node.
    assert!(out.contains("#X obj 0 0 +~;\r\n"));
}

#[test]
fn function_lexical_capture_survives_a_shadowing_caller() {
    let source = "\
shared = `r shared`
get() {
\treturn shared
}
inner() {
\tshared = `r local`
\treturn get()
}
result = inner()
result -> result";
    let out = compile(source);
    // Exactly two real objects beyond loadbang: `shared` and the local
    // shadow created inside `inner`; `get()` must still resolve to the
    // outer `shared`, so `result` is node 1, and the self-connect reflects
    // that, not the shadow at node 2.
    assert!(out.contains("#X connect 1 0 1 0;\r\n"));
}

#[test]
fn include_falls_back_to_the_bundled_stdlib() {
    let out = compile("include \"std.pd\"\nx = 1");
    assert!(out.contains("#X msg 0 0 1;\r\n"));
}

#[test]
fn include_missing_everywhere_is_an_io_error() {
    let err = flowpatch::expand::compile("include \"nope.pd\"", None, &stdlib_root()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn operator_precedence_matches_the_documented_table() {
    assert_eq!(
        parse_one("a + b * c"),
        Expr::Op(
            "+".into(),
            Box::new(Expr::Ref("a".into(), None)),
            Box::new(Expr::Op("*".into(), Box::new(Expr::Ref("b".into(), None)), Box::new(Expr::Ref("c".into(), None)))),
        )
    );
    assert_eq!(
        parse_one("a * b + c"),
        Expr::Op(
            "+".into(),
            Box::new(Expr::Op("*".into(), Box::new(Expr::Ref("a".into(), None)), Box::new(Expr::Ref("b".into(), None)))),
            Box::new(Expr::Ref("c".into(), None)),
        )
    );
    assert_eq!(
        parse_one("a - b - c"),
        Expr::Op(
            "-".into(),
            Box::new(Expr::Op("-".into(), Box::new(Expr::Ref("a".into(), None)), Box::new(Expr::Ref("b".into(), None)))),
            Box::new(Expr::Ref("c".into(), None)),
        )
    );
}

#[test]
fn universal_invariants_hold_for_a_small_program() {
    let out = compile("x = 1\ny = 2\nx -> y");
    let mut lines = out.lines();
    assert_eq!(lines.next().unwrap(), "#N canvas;");

    let node_lines: Vec<&str> = out.lines().filter(|l| l.starts_with("#X obj") || l.starts_with("#X msg") || l.starts_with("#X array")).collect();
    assert_eq!(node_lines[0], "#X obj 0 0 loadbang;");

    // Every connect references an index within the emitted node count.
    let connect_lines: Vec<&str> = out.lines().filter(|l| l.starts_with("#X connect")).collect();
    for line in &connect_lines {
        let parts: Vec<&str> = line.trim_end_matches(';').split_whitespace().collect();
        let a: usize = parts[2].parse().unwrap();
        let b: usize = parts[4].parse().unwrap();
        assert!(a < node_lines.len());
        assert!(b < node_lines.len());
    }

    // Every literal (msg) node is wired directly from !loadbang (node 0).
    for (index, line) in node_lines.iter().enumerate() {
        if line.starts_with("#X msg") {
            let wired_from_loadbang = connect_lines.iter().any(|c| *c == format!("#X connect 0 0 {index} 0;"));
            assert!(wired_from_loadbang, "node {index} missing its loadbang wire");
        }
    }
}

#[test]
fn array_statement_declares_a_node_with_no_wiring() {
    let out = compile("array \"tab1\"");
    assert_eq!(out, "#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X array tab1;\r\n");
}

#[test]
fn unbalanced_function_block_is_a_syntax_error() {
    let err = parse_program("f(a) {\n\treturn a\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
}

#[test]
fn reading_from_an_explicit_source_path_threads_include_resolution() {
    // An include relative to a real file on disk resolves against that
    // file's own directory, not the stdlib, even when a same-named file
    // also exists in the stdlib.
    let dir = std::env::temp_dir().join(format!("flowpatch-compile-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("local.pd"), "x = 1").unwrap();
    let entry = dir.join("main.pd");
    std::fs::write(&entry, "include \"local.pd\"").unwrap();

    let source = std::fs::read_to_string(&entry).unwrap();
    let out = flowpatch::expand::compile(&source, Some(Path::new(&entry)), &stdlib_root()).unwrap();
    assert!(out.contains("#X msg 0 0 1;\r\n"));

    std::fs::remove_dir_all(&dir).ok();
}
