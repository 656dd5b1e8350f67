//! Include resolution: a local directory (relative to the including file)
//! takes priority over the bundled standard-library directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolves `import_path` relative to the file that contains the
/// `include` statement, falling back to `stdlib_root`.
///
/// `including_file` is the resolved path of the file currently being
/// expanded, or `None` when the top-level source has no path (e.g. it came
/// from standard input) — in that case the "local" directory is the
/// current working directory.
///
/// The returned path becomes the next `including_file` if the resolved
/// file itself contains further `include` statements, so nested includes
/// resolve relative to their own immediate parent, not the original entry
/// file.
pub fn resolve(import_path: &str, including_file: Option<&Path>, stdlib_root: &Path) -> Result<PathBuf> {
	let local_dir = match including_file {
		Some(file) => file.parent().map(Path::to_path_buf).unwrap_or_default(),
		None => std::env::current_dir().map_err(|e| Error::io(None, e))?,
	};

	let local = local_dir.join(import_path);
	if local.is_file() {
		return Ok(local);
	}

	let stdlib = stdlib_root.join(import_path);
	if stdlib.is_file() {
		log::debug!("include \"{import_path}\" not found beside {}; falling back to stdlib", local.display());
		return Ok(stdlib);
	}

	Err(Error::io(
		Some(local),
		std::io::Error::new(std::io::ErrorKind::NotFound, format!("include \"{import_path}\" not found locally or in the stdlib")),
	))
}
