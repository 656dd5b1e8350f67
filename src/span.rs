#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct Pos {
	pub line: usize,
	pub column: usize,
}

impl std::fmt::Display for Pos {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line + 1, self.column + 1)
	}
}

#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct Span {
	pub pos: Pos,
}

impl Span {
	pub fn at(line: usize, column: usize) -> Span {
		Span {
			pos: Pos { line, column },
		}
	}
}

impl std::fmt::Display for Span {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pos)
	}
}
