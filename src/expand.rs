//! The expander/renderer: walks a statement tree in a scope, emitting
//! patch-format lines while assigning monotonically increasing node
//! indices, and recursively expanding function calls into inlined node
//! subgraphs.

use std::path::Path;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::error::{Error, Result};
use crate::include;
use crate::parser::parse_program;
use crate::scope::{Reference, Scope};
use crate::span::Span;

/// Compiles `source` into patch-format text: emits the canvas header,
/// binds `!loadbang`, then expands the parsed program in a fresh root
/// scope.
pub fn compile(source: &str, source_path: Option<&Path>, stdlib_root: &Path) -> Result<String> {
	let mut out = String::new();
	out.push_str("#N canvas;\r\n");

	let root = Scope::root();
	let loadbang = vec![Stmt::Assign("!loadbang".to_string(), Expr::Raw("loadbang".to_string()))];
	render_stmts(&loadbang, &root, source_path, stdlib_root, &mut out)?;

	let program = parse_program(source)?;
	render_stmts(&program, &root, source_path, stdlib_root, &mut out)?;
	Ok(out)
}

/// Walks `stmts` in `scope`, returning `Some(reference)` if a `Return` was
/// hit (stopping iteration early), or `None` if the whole list ran without
/// one. `current_file` is the resolved path of the file `stmts` came from,
/// threaded through so nested `include`s resolve relative to it.
fn render_stmts(
	stmts: &[Stmt],
	scope: &Rc<Scope>,
	current_file: Option<&Path>,
	stdlib_root: &Path,
	out: &mut String,
) -> Result<Option<Reference>> {
	for stmt in stmts {
		match stmt {
			Stmt::Include(path) => {
				let resolved = include::resolve(path, current_file, stdlib_root)?;
				let content = std::fs::read_to_string(&resolved).map_err(|e| Error::io(Some(resolved.clone()), e))?;
				let included = parse_program(&content)?;
				if let Some(r) = render_stmts(&included, scope, Some(resolved.as_path()), stdlib_root, out)? {
					return Ok(Some(r));
				}
			}
			Stmt::Assign(name, expr) => {
				let reference = expr_to_ref(expr, scope, current_file, stdlib_root, out)?;
				scope.bind_ref(name.clone(), reference);
			}
			Stmt::Connect(lhs, rhs) => {
				let l = expr_to_ref(lhs, scope, current_file, stdlib_root, out)?;
				let r = expr_to_ref(rhs, scope, current_file, stdlib_root, out)?;
				out.push_str(&format!("#X connect {} {} {} {};\r\n", l.node, l.port, r.node, r.port));
			}
			Stmt::Func(name, params, body) => {
				scope.bind_func(name.clone(), params.clone(), body.clone());
			}
			Stmt::Array(name) => {
				out.push_str(&format!("#X array {name};\r\n"));
				scope.create_node();
			}
			Stmt::Return(expr) => {
				let reference = expr_to_ref(expr, scope, current_file, stdlib_root, out)?;
				return Ok(Some(reference));
			}
			Stmt::Expr(expr) => {
				expr_to_ref(expr, scope, current_file, stdlib_root, out)?;
			}
		}
	}
	Ok(None)
}

/// Expands a single expression into the `(node, port)` it evaluates to,
/// emitting whatever node/wire lines that expansion requires.
fn expr_to_ref(
	expr: &Expr,
	scope: &Rc<Scope>,
	current_file: Option<&Path>,
	stdlib_root: &Path,
	out: &mut String,
) -> Result<Reference> {
	match expr {
		Expr::Ref(name, port) => {
			let bound = scope
				.lookup_ref(name)
				.ok_or_else(|| Error::expansion(Span::default(), format!("unknown reference `{name}`")))?;
			Ok(Reference { node: bound.node, port: port.unwrap_or(bound.port) })
		}
		Expr::Raw(text) => {
			out.push_str(&format!("#X obj 0 0 {text};\r\n"));
			let node = scope.create_node();
			Ok(Reference { node, port: 0 })
		}
		Expr::Str(s) => emit_literal(s, scope, out),
		Expr::Int(n) => emit_literal(&n.to_string(), scope, out),
		Expr::Float(f) => emit_literal(&f.to_string(), scope, out),
		Expr::Call(name, args) => call_function(name, args, scope, current_file, stdlib_root, out),
		Expr::Op(op, lhs, rhs) => {
			let function = if Expr::is_signal_op(op) { "op_" } else { "op" };
			let args = vec![Expr::Raw(op.clone()), (**lhs).clone(), (**rhs).clone()];
			call_function(function, &args, scope, current_file, stdlib_root, out)
		}
	}
}

/// A message node driven by `!loadbang`: the node's label is the literal's
/// source text, verbatim, with no quoting or escaping.
fn emit_literal(text: &str, scope: &Rc<Scope>, out: &mut String) -> Result<Reference> {
	out.push_str(&format!("#X msg 0 0 {text};\r\n"));
	let node = scope.create_node();
	let loadbang = scope
		.lookup_ref("!loadbang")
		.expect("!loadbang is always bound in the root scope before user code runs");
	out.push_str(&format!("#X connect {} {} {} 0;\r\n", loadbang.node, loadbang.port, node));
	Ok(Reference { node, port: 0 })
}

/// Looks up `name`, arity-checks, then expands `args` in the *caller's*
/// scope (exactly once each) before binding them as parameters in a fresh
/// child scope parented off the function's *capture* scope — not the
/// caller's scope. The body must hit a `Return`; a body that falls through
/// without one is an expansion error.
fn call_function(
	name: &str,
	args: &[Expr],
	scope: &Rc<Scope>,
	current_file: Option<&Path>,
	stdlib_root: &Path,
	out: &mut String,
) -> Result<Reference> {
	let function = scope
		.lookup_func(name)
		.ok_or_else(|| Error::expansion(Span::default(), format!("unknown function `{name}`")))?;

	if function.params.len() != args.len() {
		return Err(Error::expansion(
			Span::default(),
			format!(
				"wrong number of arguments for function `{name}`: expected {}, got {}",
				function.params.len(),
				args.len()
			),
		));
	}

	let subscope = Scope::child(&function.capture);
	for (param, arg) in function.params.iter().zip(args) {
		let reference = expr_to_ref(arg, scope, current_file, stdlib_root, out)?;
		subscope.bind_ref(param.clone(), reference);
	}

	render_stmts(&function.body, &subscope, current_file, stdlib_root, out)?
		.ok_or_else(|| Error::expansion(Span::default(), format!("missing return in function `{name}`")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn compile_here(source: &str) -> Result<String> {
		compile(source, None, std::path::Path::new("/nonexistent-stdlib"))
	}

	#[test]
	fn minimal_literal_assignment() {
		// x = 1 => msg node at index 1, wired from !loadbang (index 0).
		let out = compile_here("x = 1").unwrap();
		assert_eq!(
			out,
			"#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X msg 0 0 1;\r\n#X connect 0 0 1 0;\r\n"
		);
	}

	#[test]
	fn raw_object_assign_and_self_connect() {
		let out = compile_here("x = `float`\nx -> x").unwrap();
		assert_eq!(
			out,
			"#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X obj 0 0 float;\r\n#X connect 1 0 1 0;\r\n"
		);
	}

	#[test]
	fn array_consumes_an_index_without_wiring() {
		let out = compile_here(r#"array "tab1""#).unwrap();
		assert_eq!(out, "#N canvas;\r\n#X obj 0 0 loadbang;\r\n#X array tab1;\r\n");
	}

	#[test]
	fn unknown_reference_is_an_expansion_error() {
		let err = compile_here("x -> y").unwrap_err();
		assert!(matches!(err, Error::Expansion { .. }));
	}

	#[test]
	fn function_call_wires_parameters_and_honors_return() {
		let source = "f(a) {\n\treturn a\n}\nx = `osc~`\ny = f(x)\ny -> y";
		let out = compile_here(source).unwrap();
		// f(x) just returns its argument reference, so y == x, and the
		// final self-connect wires node 1 (the osc~ object) to itself.
		assert!(out.contains("#X obj 0 0 osc~;\r\n"));
		assert!(out.contains("#X connect 1 0 1 0;\r\n"));
	}

	#[test]
	fn missing_return_is_an_expansion_error() {
		let source = "f(a) {\n\ta\n}\nx = 1\ny = f(x)";
		let err = compile_here(source).unwrap_err();
		assert!(matches!(err, Error::Expansion { .. }));
	}

	#[test]
	fn wrong_arity_is_an_expansion_error() {
		let source = "f(a, b) {\n\treturn a\n}\nx = 1\ny = f(x)";
		let err = compile_here(source).unwrap_err();
		assert!(matches!(err, Error::Expansion { .. }));
	}

	#[test]
	fn function_captures_its_defining_scope_over_a_shadowing_caller() {
		// `shared` is bound in the root before `f` is defined; a later
		// local shadow at the call site must not leak into `f`'s body.
		let source = "shared = `r shared`\nf() {\n\treturn shared\n}\ninner() {\n\tshared = `r other`\n\treturn f()\n}\nresult = inner()";
		let out = compile_here(source).unwrap();
		// Only two `obj` lines should exist beyond loadbang: the outer
		// `shared` and the inner shadow; `f()` must resolve to the first.
		let obj_lines: Vec<&str> = out.lines().filter(|l| l.starts_with("#X obj")).collect();
		assert_eq!(obj_lines.len(), 3); // loadbang, outer shared, inner shadow
	}
}
