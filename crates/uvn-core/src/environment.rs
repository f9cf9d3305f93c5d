//! Handles to virtual environments living on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use uvn_domain::{
    format_bytes, full_version_component, interpreter_path, ExportOptions, FullVersion, LinkMode,
    Shell,
};
use walkdir::WalkDir;

use crate::config::expand_home;
use crate::error::{EnvError, EnvResult};
use crate::export;
use crate::process::{Invocation, OutputMode};
use crate::uv::{UvTool, VenvOptions};

const VERSION_SCRIPT: &str = "import platform as p; print(p.python_version(), end='')";

/// An existing environment whose interpreter reported its version.
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    path: PathBuf,
    python: PathBuf,
    name: String,
    version: String,
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Environment {}

/// Outcome of looking for an environment at a path.
#[derive(Debug)]
pub enum EnvState {
    /// No interpreter; the path is free for a new environment.
    Vacant,
    Healthy(Environment),
    /// An interpreter exists but failed to run.
    Corrupted(EnvError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub python: Option<String>,
    pub link_mode: Option<LinkMode>,
    pub quiet: bool,
}

impl Environment {
    /// Open the environment at `path`, running its interpreter once.
    /// A leading `~` is expanded to the home directory.
    pub fn open(path: impl AsRef<Path>) -> EnvResult<Self> {
        let path = absolute(&expand_home(&path.as_ref().to_string_lossy()));
        let python = interpreter_path(&path);
        if !python.exists() {
            return Err(EnvError::Missing { python });
        }
        let output = Invocation::new(python.display().to_string())
            .args(["-c", VERSION_SCRIPT])
            .run(OutputMode::Capture)
            .map_err(|err| EnvError::Corrupted {
                python: python.clone(),
                stderr: format!("{err:#}"),
            })?;
        if !output.success() {
            return Err(EnvError::Corrupted {
                python,
                stderr: output.stderr,
            });
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            version: output.stdout.trim().to_string(),
            path,
            python,
            name,
        })
    }

    pub fn inspect(path: impl AsRef<Path>) -> EnvState {
        match Self::open(path) {
            Ok(env) => EnvState::Healthy(env),
            Err(EnvError::Missing { .. }) => EnvState::Vacant,
            Err(err) => EnvState::Corrupted(err),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version reported by the interpreter at open time.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Identifier of the managed interpreter the environment was built from,
    /// read from the interpreter symlink.
    pub fn full_version(&self) -> EnvResult<FullVersion> {
        let target = fs::read_link(&self.python).map_err(|err| EnvError::Metadata {
            python: self.python.clone(),
            reason: format!("interpreter is not a symlink ({err})"),
        })?;
        let component = full_version_component(&target).ok_or_else(|| EnvError::Metadata {
            python: self.python.clone(),
            reason: format!("link target {} is too short", target.display()),
        })?;
        FullVersion::parse(&component).map_err(|err| EnvError::Metadata {
            python: self.python.clone(),
            reason: err.to_string(),
        })
    }

    /// Total bytes of regular files below the environment root.
    pub fn size(&self) -> u64 {
        WalkDir::new(&self.path)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }

    pub fn readable_size(&self) -> String {
        format_bytes(self.size())
    }

    pub fn created(&self) -> EnvResult<SystemTime> {
        let meta = fs::metadata(&self.path)
            .map_err(|err| EnvError::io(format!("read metadata of {}", self.path.display()), err))?;
        meta.created()
            .or_else(|_| meta.modified())
            .map_err(|err| EnvError::io(format!("read timestamps of {}", self.path.display()), err))
    }

    pub fn activate(&self, shell: Shell) -> String {
        shell.activate_command(&self.path)
    }

    /// Create `name` under `root` with the same interpreter and exactly the
    /// same packages as this environment.
    pub fn fork(
        &self,
        name: &str,
        root: &Path,
        link_mode: Option<LinkMode>,
        quiet: bool,
        uv: &UvTool,
    ) -> EnvResult<Environment> {
        let full_version = self.full_version()?;
        let requirements = export::requirements(self, ExportOptions::pinned(), uv)?;
        let forked = create(
            name,
            root,
            &CreateOptions {
                python: Some(full_version.to_string()),
                link_mode,
                quiet,
            },
            uv,
        )?;
        let mut file = tempfile::Builder::new()
            .prefix("uvn-fork-")
            .suffix(".txt")
            .tempfile()
            .map_err(|err| EnvError::io("create a temporary requirements file", err))?;
        file.write_all(requirements.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| EnvError::io("write the temporary requirements file", err))?;
        tracing::debug!(source = %self.name, target = %forked.name, "installing forked requirements");
        uv.pip_install(forked.path(), file.path(), quiet)?;
        Ok(forked)
    }
}

/// Environments directly below `root`, oldest first.
pub fn list(root: &Path) -> EnvResult<Vec<Environment>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(root)
        .map_err(|err| EnvError::io(format!("read {}", root.display()), err))?;
    let mut envs = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match Environment::open(&path) {
            Ok(env) => envs.push(env),
            Err(err) => tracing::debug!(path = %path.display(), %err, "skipping directory"),
        }
    }
    envs.sort_by_key(|env| env.created().unwrap_or(SystemTime::UNIX_EPOCH));
    Ok(envs)
}

pub fn create(
    name: &str,
    root: &Path,
    options: &CreateOptions,
    uv: &UvTool,
) -> EnvResult<Environment> {
    let path = absolute(&root.join(name));
    match Environment::inspect(&path) {
        EnvState::Healthy(_) => {
            return Err(EnvError::Exists {
                name: name.to_string(),
                source: None,
            })
        }
        EnvState::Corrupted(cause) => {
            return Err(EnvError::Exists {
                name: name.to_string(),
                source: Some(Box::new(cause)),
            })
        }
        EnvState::Vacant => {}
    }
    fs::create_dir_all(root)
        .map_err(|err| EnvError::io(format!("create {}", root.display()), err))?;
    uv.venv(
        &path,
        &VenvOptions {
            python: options.python.as_deref(),
            link_mode: options.link_mode,
            quiet: options.quiet,
        },
    )?;
    Environment::open(&path)
}

/// Delete `name` under `root`. Strict removal refuses paths that do not hold
/// a working environment.
pub fn remove(name: &str, root: &Path, strict: bool) -> EnvResult<bool> {
    let path = absolute(&root.join(name));
    if strict {
        Environment::open(&path)?;
    }
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&path)
        .map_err(|err| EnvError::io(format!("remove {}", path.display()), err))?;
    tracing::debug!(path = %path.display(), "removed environment");
    Ok(true)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
