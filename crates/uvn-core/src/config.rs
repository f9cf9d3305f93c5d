//! Process-wide settings and per-command context assembly.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::uv::UvTool;

pub const ROOT_ENV: &str = "UVN_DIR";
pub const UV_ENV: &str = "UVN_UV";
const DEFAULT_ROOT: &str = ".virtualenvs";

#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub json: bool,
    pub no_color: bool,
    pub debug: bool,
    pub trace: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    uv_program: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        let root = snapshot
            .var(ROOT_ENV)
            .map(expand_home)
            .unwrap_or_else(|| home().join(DEFAULT_ROOT));
        let uv_program = snapshot
            .var(UV_ENV)
            .map(str::to_string)
            .unwrap_or_else(locate_uv);
        Self { root, uv_program }
    }

    pub fn new(root: impl Into<PathBuf>, uv_program: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            uv_program: uv_program.into(),
        }
    }

    /// Directory holding managed environments.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uv(&self) -> UvTool {
        UvTool::new(self.uv_program.clone())
    }

    pub fn uv_program(&self) -> &str {
        &self.uv_program
    }
}

fn locate_uv() -> String {
    match which::which("uv") {
        Ok(path) => path.display().to_string(),
        Err(err) => {
            tracing::debug!(%err, "uv not found on PATH");
            "uv".to_string()
        }
    }
}

fn home() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        return home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(raw),
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    cwd: PathBuf,
}

impl<'a> CommandContext<'a> {
    /// Creates a context from the current process environment.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be read.
    pub fn new(global: &'a GlobalOptions) -> std::io::Result<Self> {
        Ok(Self::with_config(global, Config::from_env(), env::current_dir()?))
    }

    pub fn with_config(global: &'a GlobalOptions, config: Config, cwd: PathBuf) -> Self {
        Self {
            global,
            config,
            cwd,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn uv(&self) -> UvTool {
        self.config.uv()
    }
}
