//! Requirement list rendering from `uv pip` listings.

use serde::{Deserialize, Serialize};

/// Selects which packages are exported and how they are pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Every installed distribution (`pip freeze`) instead of only the
    /// top-level ones (`pip tree -d 0`).
    pub full: bool,
    /// `==` pins instead of `>=` lower bounds.
    pub exact: bool,
}

impl ExportOptions {
    pub const fn new(full: bool, exact: bool) -> Self {
        Self { full, exact }
    }

    /// Full, exactly pinned listing used for forks and lock files.
    pub const fn pinned() -> Self {
        Self::new(true, true)
    }

    pub fn operator(&self) -> &'static str {
        if self.exact {
            "=="
        } else {
            ">="
        }
    }

    pub fn source(&self) -> RequirementSource {
        if self.full {
            RequirementSource::Freeze
        } else {
            RequirementSource::Tree
        }
    }
}

/// The `uv pip` listing a requirement text was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    /// `uv pip freeze`: `name==version` per line.
    Freeze,
    /// `uv pip tree -d 0`: `name vversion` per line.
    Tree,
}

impl RequirementSource {
    pub fn pip_args(self) -> &'static [&'static str] {
        match self {
            Self::Freeze => &["freeze"],
            Self::Tree => &["tree", "-d", "0"],
        }
    }
}

/// Render a requirements document: a `# <full_version>` comment followed by
/// one requirement per line, rewritten to the requested pin style.
pub fn render_requirements(full_version: &str, listing: &str, options: ExportOptions) -> String {
    let operator = options.operator();
    let lines = listing
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| match options.source() {
            RequirementSource::Tree => line.replacen(" v", operator, 1),
            RequirementSource::Freeze if !options.exact => line.replace("==", operator),
            RequirementSource::Freeze => line.to_string(),
        })
        .collect::<Vec<_>>();
    let mut text = format!("# {full_version}\n{}", lines.join("\n"));
    let trimmed_len = text.trim_end().len();
    text.truncate(trimmed_len);
    text
}

/// Requirement entries of a rendered document, skipping comments.
pub fn requirement_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
