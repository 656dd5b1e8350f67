//! The layout post-processor ("autoformat").
//!
//! Translates a rendered patch into a layout-tool graph description,
//! invokes the external layout tool as a subprocess, parses its annotated
//! output for node coordinates, and rewrites the coordinate fields of the
//! patch lines in place. If the tool binary isn't found, this logs a
//! single warning and returns the patch unchanged — the one place in the
//! system where a failure doesn't abort compilation.

use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;

static POSITION_LINE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"^\s*([0-9]+).*pos="([0-9.]+),([0-9.]+)""#).unwrap());

/// Runs the full autoformat pipeline: project, invoke, parse, back-patch.
/// Returns `patch` unchanged if `tool_bin` isn't on the path.
pub fn autoformat(patch: &str, tool_bin: &str) -> String {
	let graph = project_to_dot(patch);
	match invoke_layout(tool_bin, &graph) {
		Some(layout_output) => {
			let positions = parse_positions(&layout_output);
			apply_positions(patch, &positions)
		}
		None => {
			log::warn!("`{tool_bin}` could not be found; formatting is disabled");
			patch.to_string()
		}
	}
}

/// Step 1: walk the patch line by line, projecting it into the layout
/// tool's textual graph language. `#X connect a b c d` becomes `d -> b;`
/// (direction reversed, reflecting the layout tool's top-down-from-sinks
/// convention). Each `#X obj`/`#X msg` becomes a bare node line carrying
/// the same index the renderer assigned it; `#X array` advances the
/// counter without being projected.
pub fn project_to_dot(patch: &str) -> String {
	let mut index = 0usize;
	let mut out = String::from("digraph _ {\n");

	for line in patch.lines() {
		if line.starts_with("#X connect") {
			let parts: Vec<&str> = line.split_whitespace().collect();
			let a = parts[2];
			let b = parts[4];
			out.push_str(&format!("  {b} -> {a};\n"));
		} else if line.starts_with("#X obj") || line.starts_with("#X msg") {
			out.push_str(&format!("  {index};\n"));
			index += 1;
		} else if line.starts_with("#X array") {
			index += 1;
		}
	}

	out.push_str("}\n");
	out
}

/// Step 2: pipe `graph` to the layout tool's stdin, wait for it to exit,
/// and return its stdout. `None` means the binary itself wasn't found;
/// any other failure (nonzero exit, empty output) is treated the same as
/// success with no annotations, per the spec's resource model.
fn invoke_layout(tool_bin: &str, graph: &str) -> Option<String> {
	let mut child = match Command::new(tool_bin).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null()).spawn() {
		Ok(child) => child,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
		Err(e) => {
			log::warn!("failed to start `{tool_bin}`: {e}");
			return None;
		}
	};

	let mut stdin = child.stdin.take().expect("stdin was requested as piped");
	// Best-effort: if the child has already exited, the write may fail;
	// that's equivalent to the child producing no output.
	let _ = stdin.write_all(graph.as_bytes());
	drop(stdin);

	let output = child.wait_with_output().ok()?;
	Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Step 3: parses `index -> (x, y)` from the layout tool's annotated
/// output. Continuation lines (a trailing comma immediately before a
/// newline) are folded into the following line before matching.
fn parse_positions(layout_output: &str) -> HashMap<usize, (f64, f64)> {
	let joined = layout_output.replace(",\n", ", ");
	let mut positions = HashMap::new();
	for line in joined.lines() {
		if let Some(caps) = POSITION_LINE.captures(line) {
			let index: usize = caps[1].parse().expect("regex guarantees digits");
			let x: f64 = caps[2].parse().expect("regex guarantees a float");
			let y: f64 = caps[3].parse().expect("regex guarantees a float");
			positions.insert(index, (x, y));
		}
	}
	positions
}

/// Step 4: traverses the patch again with the same counting scheme,
/// replacing the two coordinate fields of every `#X obj`/`#X msg` line
/// with the looked-up position. A node with no recorded position is an
/// invariant violation the layout tool itself should never produce (it
/// was asked to lay out every node the renderer emitted) — surfaced as a
/// panic rather than a recoverable error, matching the crash-on-missing
/// behavior described in the source material.
pub fn apply_positions(patch: &str, positions: &HashMap<usize, (f64, f64)>) -> String {
	let mut index = 0usize;
	let mut out = String::new();

	for line in patch.lines() {
		if line.starts_with("#X obj") || line.starts_with("#X msg") {
			let (x, y) = positions
				.get(&index)
				.unwrap_or_else(|| panic!("autoformat produced no position for node {index}"));
			let mut parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
			parts[2] = x.to_string();
			parts[3] = y.to_string();
			out.push_str(&parts.join(" "));
			out.push_str("\r\n");
			index += 1;
		} else {
			if line.starts_with("#X array") {
				index += 1;
			}
			out.push_str(line);
			out.push_str("\r\n");
		}
	}

	out
}
