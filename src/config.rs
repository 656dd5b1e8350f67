//! Resolves the two pieces of the system that are configurable: the
//! layout tool binary, and the stdlib root directory. Both are read once
//! at CLI startup and threaded down as plain parameters, so the core
//! library stays reusable from tests without going through the CLI.

use std::path::PathBuf;

const DEFAULT_DOT_BIN: &str = "dot";

pub struct Config {
	pub dot_bin: String,
	pub stdlib_root: PathBuf,
}

impl Config {
	/// Reads `FLOWPATCH_DOT` and `FLOWPATCH_STDLIB` if set, otherwise
	/// falls back to `dot` on `PATH` and a `stdlib/` directory next to the
	/// running executable.
	pub fn from_env() -> Config {
		let dot_bin = std::env::var("FLOWPATCH_DOT").unwrap_or_else(|_| DEFAULT_DOT_BIN.to_string());
		let stdlib_root = std::env::var_os("FLOWPATCH_STDLIB")
			.map(PathBuf::from)
			.unwrap_or_else(default_stdlib_root);
		Config { dot_bin, stdlib_root }
	}
}

fn default_stdlib_root() -> PathBuf {
	let beside_exe = std::env::current_exe()
		.ok()
		.and_then(|exe| exe.parent().map(|dir| dir.join("stdlib")));
	match beside_exe {
		Some(dir) if dir.is_dir() => dir,
		// Development/test convenience: when not installed next to a
		// built binary, fall back to the stdlib shipped in the crate's
		// own source tree.
		_ => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("stdlib"),
	}
}
