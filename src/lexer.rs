//! Regex-driven atom matching over a single already-stripped source line.
//!
//! The grammar has no separate tokenizer stage: each parser alternative
//! matches one of the atom patterns below directly against the remaining
//! text. [`Cursor`] is a small, `Copy` position over a line, so parser
//! alternatives can be attempted speculatively and rolled back by cloning
//! the cursor before the attempt.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::span::Span;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
static INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());
static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+").unwrap());
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"[^"]*""#).unwrap());
static RAW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^`[^`]*`").unwrap());
static PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:[0-9]+").unwrap());
static OP: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^(\*~|\*|/~|/|\+~|\+|-~|-|<<|>>|&|\|)").unwrap());

/// A position over the remainder of one source line.
///
/// `Cursor` is intentionally `Copy`: the parser takes speculative attempts
/// by copying a cursor, trying an alternative, and discarding the copy if
/// it fails.
#[derive(Copy, Clone, Debug)]
pub struct Cursor<'a> {
	rest: &'a str,
	line: usize,
	column: usize,
}

impl<'a> Cursor<'a> {
	pub fn new(line: usize, text: &'a str) -> Self {
		Cursor {
			rest: text,
			line,
			column: 0,
		}
	}

	pub fn span(&self) -> Span {
		Span::at(self.line, self.column)
	}

	pub fn rest(&self) -> &'a str {
		self.rest
	}

	pub fn at_end(&self) -> bool {
		self.rest.is_empty()
	}

	fn advance(&mut self, len: usize) {
		self.rest = &self.rest[len..];
		self.column += len;
	}

	pub fn skip_spaces(&mut self) {
		let len = self.rest.len() - self.rest.trim_start_matches([' ', '\t']).len();
		self.advance(len);
	}

	/// Matches `re` anchored at the current position, advancing past it.
	fn eat(&mut self, re: &Regex) -> Option<&'a str> {
		let m = re.find(self.rest)?;
		debug_assert_eq!(m.start(), 0);
		let text = &self.rest[..m.end()];
		self.advance(m.end());
		Some(text)
	}

	/// Matches a literal string, surrounded by optional spaces on both sides.
	pub fn eat_literal(&mut self, literal: &str) -> Option<()> {
		let mut probe = *self;
		probe.skip_spaces();
		if probe.rest.starts_with(literal) {
			probe.advance(literal.len());
			probe.skip_spaces();
			*self = probe;
			Some(())
		} else {
			None
		}
	}

	pub fn eat_name(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		let text = probe.eat(&NAME)?;
		*self = probe;
		Some(text)
	}

	pub fn eat_int(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		// float must be tried before int by the caller; this only matches
		// a bare integer, so a leading float literal must be rejected.
		if FLOAT.is_match(probe.rest) {
			return None;
		}
		let text = probe.eat(&INT)?;
		*self = probe;
		Some(text)
	}

	pub fn eat_float(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		let text = probe.eat(&FLOAT)?;
		*self = probe;
		Some(text)
	}

	pub fn eat_string(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		let text = probe.eat(&STRING)?;
		*self = probe;
		Some(&text[1..text.len() - 1])
	}

	pub fn eat_raw(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		let text = probe.eat(&RAW)?;
		*self = probe;
		Some(&text[1..text.len() - 1])
	}

	pub fn eat_port(&mut self) -> Option<u32> {
		let mut probe = *self;
		let text = probe.eat(&PORT)?;
		*self = probe;
		Some(text[1..].parse().expect("port regex guarantees digits"))
	}

	pub fn eat_op(&mut self) -> Option<&'a str> {
		let mut probe = *self;
		probe.skip_spaces();
		let text = probe.eat(&OP)?;
		*self = probe;
		Some(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn name_then_port() {
		let mut cursor = Cursor::new(0, "foo:12");
		assert_eq!(cursor.eat_name(), Some("foo"));
		assert_eq!(cursor.eat_port(), Some(12));
	}

	#[test]
	fn float_rejects_bare_integer() {
		let mut cursor = Cursor::new(0, "42");
		assert_eq!(cursor.eat_float(), None);
	}

	#[test]
	fn int_rejects_when_a_float_is_present() {
		let mut cursor = Cursor::new(0, "4.2");
		assert_eq!(cursor.eat_int(), None);
	}

	#[test]
	fn string_and_raw_strip_delimiters_without_unescaping() {
		let mut cursor = Cursor::new(0, r#""hi \n there""#);
		assert_eq!(cursor.eat_string(), Some(r"hi \n there"));

		let mut cursor = Cursor::new(0, "`+ 1 2`");
		assert_eq!(cursor.eat_raw(), Some("+ 1 2"));
	}

	#[test]
	fn literal_consumes_surrounding_spaces() {
		let mut cursor = Cursor::new(0, "  ->  y");
		assert!(cursor.eat_literal("->").is_some());
		assert_eq!(cursor.rest(), "y");
	}

	#[test]
	fn two_character_operators_are_tried_before_their_prefix() {
		let mut cursor = Cursor::new(0, "*~ x");
		assert_eq!(cursor.eat_op(), Some("*~"));
	}
}
