use std::path::PathBuf;

use serde_json::{json, Value};

/// Every failure surfaced by environment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("no interpreter at {}", python.display())]
    Missing { python: PathBuf },
    #[error("interpreter at {} failed to report its version", python.display())]
    Corrupted { python: PathBuf, stderr: String },
    #[error("environment `{name}` already exists")]
    Exists {
        name: String,
        #[source]
        source: Option<Box<EnvError>>,
    },
    #[error("{message}")]
    Uv { message: String, stderr: String },
    #[error("{0}")]
    Feature(String),
    #[error("cannot determine the full version of {}: {reason}", python.display())]
    Metadata { python: PathBuf, reason: String },
    #[error("failed to {action}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

pub type EnvResult<T> = Result<T, EnvError>;

impl EnvError {
    pub(crate) fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }

    pub(crate) fn uv(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Uv {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Stable identifier used in machine readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing",
            Self::Corrupted { .. } => "corrupted",
            Self::Exists { .. } => "exists",
            Self::Uv { .. } => "uv",
            Self::Feature(_) => "feature",
            Self::Metadata { .. } => "metadata",
            Self::Io { .. } => "io",
        }
    }

    /// Captured stderr of the failing child process, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Corrupted { stderr, .. } | Self::Uv { stderr, .. } if !stderr.trim().is_empty() => {
                Some(stderr.as_str())
            }
            Self::Exists {
                source: Some(inner),
                ..
            } => inner.stderr(),
            _ => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        match self {
            Self::Corrupted { .. } => true,
            Self::Exists {
                source: Some(inner),
                ..
            } => inner.is_corrupted(),
            _ => false,
        }
    }

    pub fn details(&self) -> Value {
        let mut details = json!({ "reason": self.kind() });
        if let Some(stderr) = self.stderr() {
            details["stderr"] = Value::String(stderr.trim_end().to_string());
        }
        match self {
            Self::Missing { python }
            | Self::Corrupted { python, .. }
            | Self::Metadata { python, .. } => {
                details["python"] = Value::String(python.display().to_string());
            }
            Self::Exists { name, .. } => {
                details["name"] = Value::String(name.clone());
            }
            _ => {}
        }
        if let Some(hint) = self.hint() {
            details["hint"] = Value::String(hint.to_string());
        }
        details
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Missing { .. } => Some("run `uvn list` to see available environments"),
            Self::Exists {
                source: Some(_), ..
            } => Some("the existing environment looks corrupted; remove it with `uvn remove --force`"),
            Self::Exists { .. } => Some("pick another name or remove the existing environment"),
            Self::Corrupted { .. } => Some("use --force to remove it anyways"),
            _ => None,
        }
    }
}
