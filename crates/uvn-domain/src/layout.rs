//! On-disk conventions of virtual environments created by `uv`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Interpreter location relative to the environment root.
pub fn interpreter_relative_path() -> &'static Path {
    if cfg!(windows) {
        Path::new("Scripts/python.exe")
    } else {
        Path::new("bin/python")
    }
}

pub fn interpreter_path(env: &Path) -> PathBuf {
    env.join(interpreter_relative_path())
}

/// Component of an interpreter symlink target holding the full version
/// (`.../<full_version>/bin/python3.12`).
pub fn full_version_component(link_target: &Path) -> Option<String> {
    let parts = link_target
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    parts
        .len()
        .checked_sub(3)
        .and_then(|idx| parts.get(idx).cloned())
}

/// How `uv` links packages from its global cache into an environment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkMode {
    Clone,
    Copy,
    Hardlink,
    Symlink,
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    fn format_scaled(value: u64, unit: u64, suffix: &str) -> String {
        let whole = value / unit;
        let remainder = value % unit;
        let tenths = (remainder * 10) / unit;
        format!("{whole}.{tenths} {suffix}")
    }

    if bytes >= GB {
        format_scaled(bytes, GB, "GB")
    } else if bytes >= MB {
        format_scaled(bytes, MB, "MB")
    } else if bytes >= KB {
        format_scaled(bytes, KB, "KB")
    } else {
        format!("{bytes} B")
    }
}
