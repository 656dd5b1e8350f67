//! Compiles the patch-algebra DSL into the on-disk patch format: a
//! hand-written recursive-descent parser and a lexically scoped expander
//! produce flat node/wire text, which an optional layout post-process
//! then back-patches with coordinates from an external graph-layout tool.

pub mod ast;
pub mod autoformat;
pub mod config;
pub mod error;
pub mod expand;
pub mod include;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod span;

pub use config::Config;
pub use error::{Error, Result};

use std::path::Path;

/// Compiles `source` (from `source_path`, or `None` for an unnamed stream
/// such as standard input) into patch-format text, then runs autoformat
/// over the result using `config`.
pub fn compile(source: &str, source_path: Option<&Path>, config: &Config) -> Result<String> {
	let rendered = expand::compile(source, source_path, &config.stdlib_root)?;
	Ok(autoformat::autoformat(&rendered, &config.dot_bin))
}
