//! Hand-written recursive-descent parser.
//!
//! The file is read line by line; blank lines and `#`-prefixed lines are
//! skipped, and each remaining line is parsed as exactly one statement.
//! There is no error recovery: the first line that fails every ordered
//! alternative aborts the whole parse.

mod expr;
pub use expr::{parse_expr, parse_expr_no_op, parse_list};

use crate::ast::Stmt;
use crate::error::{Error, Result};
use crate::lexer::Cursor;

/// The outcome of parsing a single line. [`StartFunc`]/[`EndFunc`] are not
/// themselves [`Stmt`]s — they drive the block-nesting stack in
/// [`parse_program`], which folds a matched pair into a [`Stmt::Func`].
enum Line {
	Stmt(Stmt),
	StartFunc(String, Vec<String>),
	EndFunc,
}

/// Parses the whole source text into an ordered sequence of top-level
/// statements, with function bodies nested inside their `Func` statement.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>> {
	let mut stack: Vec<Vec<Stmt>> = vec![Vec::new()];
	let mut headers: Vec<(String, Vec<String>)> = Vec::new();

	for (lineno, raw_line) in source.lines().enumerate() {
		let line = raw_line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		match parse_line(line, lineno)? {
			Line::StartFunc(name, params) => {
				headers.push((name, params));
				stack.push(Vec::new());
			}
			Line::EndFunc => {
				let body = stack.pop().ok_or_else(|| {
					Error::syntax(crate::span::Span::at(lineno, 0), vec!["unbalanced blocks".into()])
				})?;
				let (name, params) = headers.pop().ok_or_else(|| {
					Error::syntax(crate::span::Span::at(lineno, 0), vec!["unbalanced blocks".into()])
				})?;
				stack
					.last_mut()
					.expect("the outermost frame is never popped")
					.push(Stmt::Func(name, params, body));
			}
			Line::Stmt(stmt) => {
				stack.last_mut().expect("at least one frame is always present").push(stmt);
			}
		}
	}

	if stack.len() != 1 {
		return Err(Error::syntax(
			crate::span::Span::at(source.lines().count(), 0),
			vec!["unbalanced blocks".into()],
		));
	}
	Ok(stack.pop().unwrap())
}

/// Tries every statement alternative in order, in the precedence laid out
/// by the grammar, and accepts the first one that consumes the whole line.
fn parse_line(line: &str, lineno: usize) -> Result<Line> {
	let alternatives: [(&str, fn(&mut Cursor) -> Option<Line>); 8] = [
		("include", |c| parse_include(c).map(|p| Line::Stmt(Stmt::Include(p)))),
		("array", |c| parse_array(c).map(|n| Line::Stmt(Stmt::Array(n)))),
		("return", |c| parse_return(c).map(|e| Line::Stmt(Stmt::Return(e)))),
		("connect", |c| parse_connect(c).map(|(l, r)| Line::Stmt(Stmt::Connect(l, r)))),
		("assign", |c| parse_assign(c).map(|(n, e)| Line::Stmt(Stmt::Assign(n, e)))),
		("startfunc", |c| parse_startfunc(c).map(|(n, p)| Line::StartFunc(n, p))),
		("endfunc", |c| parse_endfunc(c).map(|_| Line::EndFunc)),
		("expr", |c| parse_expr(c).map(|e| Line::Stmt(Stmt::Expr(e)))),
	];

	let mut failed = Vec::new();
	for (name, alt) in alternatives {
		let mut cursor = Cursor::new(lineno, line);
		if let Some(result) = alt(&mut cursor) {
			cursor.skip_spaces();
			if cursor.at_end() {
				return Ok(result);
			}
		}
		failed.push(format!("not a valid `{name}` statement"));
	}

	Err(Error::syntax(crate::span::Span::at(lineno, 0), failed))
}

fn parse_include(cursor: &mut Cursor) -> Option<String> {
	let checkpoint = *cursor;
	if cursor.eat_literal("include").is_some() {
		if let Some(path) = cursor.eat_string() {
			return Some(path.to_string());
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_array(cursor: &mut Cursor) -> Option<String> {
	let checkpoint = *cursor;
	if cursor.eat_literal("array").is_some() {
		if let Some(name) = cursor.eat_string() {
			return Some(name.to_string());
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_return(cursor: &mut Cursor) -> Option<crate::ast::Expr> {
	let checkpoint = *cursor;
	if cursor.eat_literal("return").is_some() {
		if let Some(expr) = parse_expr(cursor) {
			return Some(expr);
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_connect(cursor: &mut Cursor) -> Option<(crate::ast::Expr, crate::ast::Expr)> {
	let checkpoint = *cursor;
	if let Some(lhs) = parse_expr(cursor) {
		if cursor.eat_literal("->").is_some() {
			if let Some(rhs) = parse_expr(cursor) {
				return Some((lhs, rhs));
			}
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_assign(cursor: &mut Cursor) -> Option<(String, crate::ast::Expr)> {
	let checkpoint = *cursor;
	if let Some(name) = cursor.eat_name() {
		if cursor.eat_literal("=").is_some() {
			if let Some(expr) = parse_expr(cursor) {
				return Some((name.to_string(), expr));
			}
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_startfunc(cursor: &mut Cursor) -> Option<(String, Vec<String>)> {
	let checkpoint = *cursor;
	if let Some(name) = cursor.eat_name() {
		if let Some(params) = parse_list(cursor, |c| c.eat_name().map(|n| n.to_string())) {
			if cursor.eat_literal("{").is_some() {
				return Some((name.to_string(), params));
			}
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_endfunc(cursor: &mut Cursor) -> Option<()> {
	cursor.eat_literal("}")
}
