//! Expression parsing: the no-operator alternatives, plus a shunting-yard
//! precedence climb for the binary operator table.

use crate::ast::Expr;
use crate::lexer::Cursor;

fn precedence(op: &str) -> u8 {
	match op {
		"*" | "*~" | "/" | "/~" => 12,
		"+" | "+~" | "-" | "-~" => 11,
		"<<" | ">>" => 10,
		"&" => 7,
		"|" => 5,
		_ => unreachable!("the operator regex only matches operators in the precedence table"),
	}
}

/// `parens | call | ref | str | float | int | raw`, in that order: `call`
/// must be tried before `ref` (both start with a name), and `float` before
/// `int` (an integer prefix would otherwise shadow a float literal).
pub fn parse_expr_no_op(cursor: &mut Cursor) -> Option<Expr> {
	parse_parens(cursor)
		.or_else(|| parse_call(cursor))
		.or_else(|| parse_ref(cursor))
		.or_else(|| parse_str(cursor))
		.or_else(|| parse_float(cursor))
		.or_else(|| parse_int(cursor))
		.or_else(|| parse_raw(cursor))
}

/// A full expression: one `expr_no_op` followed by zero or more
/// `(op, expr_no_op)` pairs, folded left-associatively with an explicit
/// op-stack/value-stack shunting pass.
///
/// Each `(op, expr_no_op)` pair is all-or-nothing: if an operator is seen
/// but no operand follows it, the whole pair is rolled back and parsing
/// stops, leaving the operator (and whatever follows) unconsumed for the
/// caller to try a different alternative against (this is what lets
/// `x -> y` parse as `Connect(x, y)` rather than failing on `x`'s trailing
/// `-` being mistaken for a partial operator).
pub fn parse_expr(cursor: &mut Cursor) -> Option<Expr> {
	let first = parse_expr_no_op(cursor)?;

	let mut op_stack: Vec<(String, u8)> = Vec::new();
	let mut val_stack: Vec<Expr> = vec![first];

	loop {
		let checkpoint = *cursor;
		let op = match cursor.eat_op() {
			Some(op) => op.to_string(),
			None => break,
		};
		let prec = precedence(&op);
		let rhs = match parse_expr_no_op(cursor) {
			Some(rhs) => rhs,
			None => {
				*cursor = checkpoint;
				break;
			}
		};

		while let Some((_, top_prec)) = op_stack.last() {
			if *top_prec >= prec {
				fold_top(&mut op_stack, &mut val_stack);
			} else {
				break;
			}
		}
		op_stack.push((op, prec));
		val_stack.push(rhs);
	}

	while !op_stack.is_empty() {
		fold_top(&mut op_stack, &mut val_stack);
	}

	debug_assert_eq!(val_stack.len(), 1);
	val_stack.pop()
}

fn fold_top(op_stack: &mut Vec<(String, u8)>, val_stack: &mut Vec<Expr>) {
	let (op, _) = op_stack.pop().expect("fold_top called with an empty op stack");
	let rhs = val_stack.pop().expect("shunting-yard value stack underflow");
	let lhs = val_stack.pop().expect("shunting-yard value stack underflow");
	val_stack.push(Expr::Op(op, Box::new(lhs), Box::new(rhs)));
}

fn parse_parens(cursor: &mut Cursor) -> Option<Expr> {
	let checkpoint = *cursor;
	if cursor.eat_literal("(").is_some() {
		if let Some(inner) = parse_expr(cursor) {
			if cursor.eat_literal(")").is_some() {
				return Some(inner);
			}
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_call(cursor: &mut Cursor) -> Option<Expr> {
	let checkpoint = *cursor;
	if let Some(name) = cursor.eat_name() {
		if let Some(args) = parse_arg_list(cursor) {
			return Some(Expr::Call(name.to_string(), args));
		}
	}
	*cursor = checkpoint;
	None
}

fn parse_ref(cursor: &mut Cursor) -> Option<Expr> {
	let checkpoint = *cursor;
	if let Some(name) = cursor.eat_name() {
		let port = cursor.eat_port();
		return Some(Expr::Ref(name.to_string(), port));
	}
	*cursor = checkpoint;
	None
}

fn parse_str(cursor: &mut Cursor) -> Option<Expr> {
	cursor.eat_string().map(|s| Expr::Str(s.to_string()))
}

fn parse_float(cursor: &mut Cursor) -> Option<Expr> {
	cursor.eat_float().map(|f| Expr::Float(f.parse().expect("float regex guarantees a valid float")))
}

fn parse_int(cursor: &mut Cursor) -> Option<Expr> {
	cursor.eat_int().map(|i| Expr::Int(i.parse().expect("int regex guarantees a valid integer")))
}

fn parse_raw(cursor: &mut Cursor) -> Option<Expr> {
	cursor.eat_raw().map(|s| Expr::Raw(s.to_string()))
}

/// `(expr, expr, …)`, comma-separated, with the parentheses consumed here
/// (mirrors a call's argument list and a function's parameter list).
pub fn parse_arg_list(cursor: &mut Cursor) -> Option<Vec<Expr>> {
	parse_list(cursor, parse_expr)
}

pub fn parse_list<T>(cursor: &mut Cursor, parse_item: impl Fn(&mut Cursor) -> Option<T>) -> Option<Vec<T>> {
	let checkpoint = *cursor;
	if cursor.eat_literal("(").is_none() {
		*cursor = checkpoint;
		return None;
	}

	let mut items = Vec::new();
	loop {
		let mut probe = *cursor;
		probe.skip_spaces();
		if probe.rest().starts_with(')') {
			break;
		}
		if !items.is_empty() && cursor.eat_literal(",").is_none() {
			*cursor = checkpoint;
			return None;
		}
		match parse_item(cursor) {
			Some(item) => items.push(item),
			None => {
				*cursor = checkpoint;
				return None;
			}
		}
	}

	if cursor.eat_literal(")").is_none() {
		*cursor = checkpoint;
		return None;
	}
	Some(items)
}
