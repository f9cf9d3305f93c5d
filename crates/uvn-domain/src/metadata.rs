//! Dependency metadata rendering for project manifests and inline scripts.

use crate::full_version::FullVersion;
use crate::requirements::requirement_lines;

/// Command placed in the shebang of exported scripts.
pub const SCRIPT_RUNNER: &str = "uv run";

const SCRIPT_BLOCK_START: &str = "# /// script";
const SCRIPT_BLOCK_END: &str = "# ///";

/// Render the `requires-python` constraint and, when there is anything to
/// list, the `dependencies` array for a requirements document.
///
/// Exact exports pin the interpreter to the version segment of the full
/// version, inexact ones only require the running version as a lower bound.
pub fn render_dependencies(
    requirements: &str,
    full_version: &FullVersion,
    runtime_version: &str,
    exact: bool,
) -> String {
    let constraint = if exact {
        format!("=={}", full_version.version_segment())
    } else {
        format!(">={runtime_version}")
    };
    let entries = requirement_lines(requirements)
        .map(|line| format!("    \"{}\",", escape_basic_string(line)))
        .collect::<Vec<_>>();
    let mut text = format!("requires-python = \"{constraint}\" # {full_version}");
    if !entries.is_empty() {
        text.push_str("\ndependencies = [\n");
        text.push_str(&entries.join("\n"));
        text.push_str("\n]");
    }
    text
}

/// Minimal `[project]` table carrying the environment's dependencies.
pub fn render_pyproject(name: &str, dependencies: &str) -> String {
    format!(
        "[project]\nname = \"{}\"\ndynamic = [\"version\"]\n{dependencies}",
        escape_basic_string(name)
    )
}

/// Prepend an inline script metadata block to `existing`.
///
/// A metadata block already heading the script (optionally behind a shebang)
/// is replaced rather than stacked, so repeated exports converge to the same
/// text. Everything after the old block is kept verbatim.
pub fn merge_script_metadata(existing: &str, dependencies: &str) -> String {
    let body = strip_script_metadata(existing);
    let block = dependencies.replace('\n', "\n# ");
    format!("#!/usr/bin/env -S {SCRIPT_RUNNER}\n{SCRIPT_BLOCK_START}\n# {block}\n{SCRIPT_BLOCK_END}\n{body}")
}

/// Return the script body that follows a leading shebang and metadata block.
pub fn strip_script_metadata(text: &str) -> &str {
    let (body, had_shebang) = if text.starts_with("#!") {
        (next_line(text).map_or("", |(_, rest)| rest), true)
    } else {
        (text, false)
    };
    if let Some(rest) = skip_metadata_block(body) {
        return rest;
    }
    if had_shebang {
        body
    } else {
        text
    }
}

fn skip_metadata_block(text: &str) -> Option<&str> {
    let (first, mut rest) = next_line(text)?;
    if first != SCRIPT_BLOCK_START {
        return None;
    }
    loop {
        let (line, remainder) = next_line(rest)?;
        if line == SCRIPT_BLOCK_END {
            return Some(remainder);
        }
        if line != "#" && !line.starts_with("# ") {
            return None;
        }
        rest = remainder;
    }
}

fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(idx) => Some((text[..idx].trim_end_matches('\r'), &text[idx + 1..])),
        None => Some((text, "")),
    }
}

fn escape_basic_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
