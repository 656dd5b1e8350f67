use std::fmt;
use std::path::PathBuf;

use crate::span::Span;

#[derive(Debug)]
pub enum Error {
	Syntax { span: Span, alternatives: Vec<String> },
	Expansion { span: Span, message: String },
	Io { path: Option<PathBuf>, source: std::io::Error },
}

impl Error {
	pub fn syntax(span: Span, alternatives: Vec<String>) -> Error {
		Error::Syntax { span, alternatives }
	}

	pub fn expansion(span: Span, message: impl Into<String>) -> Error {
		Error::Expansion { span, message: message.into() }
	}

	pub fn io(path: Option<PathBuf>, source: std::io::Error) -> Error {
		Error::Io { path, source }
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Syntax { span, alternatives } => {
				write!(f, "{span}: syntax error")?;
				if !alternatives.is_empty() {
					write!(f, " ({})", alternatives.join("; "))?;
				}
				Ok(())
			}
			Error::Expansion { span, message } => write!(f, "{span}: {message}"),
			Error::Io { path, source } => match path {
				Some(path) => write!(f, "{}: {source}", path.display()),
				None => write!(f, "{source}"),
			},
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io { source, .. } => Some(source),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
