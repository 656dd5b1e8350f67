//! Tagged-sum AST for the patch DSL.
//!
//! Pattern matching in the parser and expander replaces the string-tag
//! dispatch of a dynamically-typed front end.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	/// A reference to a previously-assigned name, with an optional
	/// explicit output port (`name:port`).
	Ref(String, Option<u32>),
	Str(String),
	Int(i64),
	Float(f64),
	/// Verbatim object text, passed through to the emitted patch untouched.
	Raw(String),
	Call(String, Vec<Expr>),
	/// `op` is the operator spelling (e.g. `"+"`, `"*~"`); expansion
	/// desugars this to a call to `op` or `op_`.
	Op(String, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
	Include(String),
	Assign(String, Expr),
	Connect(Expr, Expr),
	Func(String, Vec<String>, Vec<Stmt>),
	Return(Expr),
	/// Declares a named array node; consumes one node index, no wiring.
	Array(String),
	/// A bare expression, evaluated for its side effects (node creation).
	Expr(Expr),
}

impl Expr {
	/// `true` if this operator spelling denotes an audio-rate (signal)
	/// variant, routed through `op_` instead of `op`.
	pub fn is_signal_op(op: &str) -> bool {
		op.ends_with('~')
	}
}

/// Deterministic re-serializer: every `Op` is fully parenthesized so the
/// printed text reparses to the same tree regardless of precedence, and a
/// whole-valued `Float` keeps an explicit `.0` so it doesn't reparse as an
/// `Int`.
impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expr::Ref(name, None) => write!(f, "{name}"),
			Expr::Ref(name, Some(port)) => write!(f, "{name}:{port}"),
			Expr::Str(s) => write!(f, "\"{s}\""),
			Expr::Int(n) => write!(f, "{n}"),
			Expr::Float(x) if x.fract() == 0.0 => write!(f, "{x:.1}"),
			Expr::Float(x) => write!(f, "{x}"),
			Expr::Raw(text) => write!(f, "`{text}`"),
			Expr::Call(name, args) => {
				write!(f, "{name}(")?;
				for (i, arg) in args.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{arg}")?;
				}
				write!(f, ")")
			}
			Expr::Op(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
		}
	}
}

impl fmt::Display for Stmt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Stmt::Include(path) => write!(f, "include \"{path}\""),
			Stmt::Assign(name, expr) => write!(f, "{name} = {expr}"),
			Stmt::Connect(lhs, rhs) => write!(f, "{lhs} -> {rhs}"),
			Stmt::Func(name, params, body) => {
				writeln!(f, "{name}({}) {{", params.join(", "))?;
				for stmt in body {
					writeln!(f, "{stmt}")?;
				}
				write!(f, "}}")
			}
			Stmt::Return(expr) => write!(f, "return {expr}"),
			Stmt::Array(name) => write!(f, "array \"{name}\""),
			Stmt::Expr(expr) => write!(f, "{expr}"),
		}
	}
}
