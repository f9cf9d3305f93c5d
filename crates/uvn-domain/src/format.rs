use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Output format of an export, decided once from the target's extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "format", content = "extension")]
pub enum ExportFormat {
    /// `.txt` requirements list.
    Requirements,
    /// `.py` script with inline metadata.
    ScriptMetadata,
    /// `.toml` project manifest.
    Manifest,
    /// `.lock` resolved lock file.
    Lock,
    Unrecognized(String),
}

impl ExportFormat {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "txt" => Self::Requirements,
            "py" => Self::ScriptMetadata,
            "toml" => Self::Manifest,
            "lock" => Self::Lock,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&extension)
    }

    /// Bare format names (`txt`, `toml`, `py`, `lock`) select a format without
    /// naming a file.
    pub fn from_bare_name(name: &str) -> Option<Self> {
        match Self::from_extension(name) {
            Self::Unrecognized(_) => None,
            format => Some(format),
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Requirements => "txt",
            Self::ScriptMetadata => "py",
            Self::Manifest => "toml",
            Self::Lock => "lock",
            Self::Unrecognized(ext) => ext,
        }
    }

    /// Formats that merge into the existing content of their target.
    pub fn reads_existing(&self) -> bool {
        matches!(self, Self::ScriptMetadata | Self::Manifest)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requirements => f.write_str("requirements"),
            Self::ScriptMetadata => f.write_str("script metadata"),
            Self::Manifest => f.write_str("pyproject manifest"),
            Self::Lock => f.write_str("lock file"),
            Self::Unrecognized(ext) if ext.is_empty() => f.write_str("unrecognized format"),
            Self::Unrecognized(ext) => write!(f, "unrecognized format `.{ext}`"),
        }
    }
}
