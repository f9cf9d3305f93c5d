//! Entry points behind each `uvn` subcommand.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use uvn_domain::{ExportFormat, ExportOptions, LinkMode, Shell};

use crate::config::CommandContext;
use crate::environment::{self, CreateOptions, Environment};
use crate::error::EnvError;
use crate::export;
use crate::outcome::ExecutionOutcome;

/// Name that stands for the project-local `.venv`.
pub const LOCAL_ENV_ALIAS: &str = ".";
pub const LOCAL_ENV_NAME: &str = ".venv";

#[derive(Clone, Debug, Default)]
pub struct ListRequest {
    pub directory: Option<PathBuf>,
    pub size: bool,
    pub full_version: bool,
}

#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub name: String,
    pub python: Option<String>,
    pub link_mode: Option<LinkMode>,
    pub directory: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Clone, Debug)]
pub struct RemoveRequest {
    pub name: String,
    pub force: bool,
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub name: String,
    /// A bare format name (`txt`, `toml`, `py`, `lock`) or a file path.
    pub target: String,
    pub short: bool,
    pub lower: bool,
    pub directory: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Clone, Debug)]
pub struct ForkRequest {
    pub name: String,
    pub new_name: String,
    pub link_mode: Option<LinkMode>,
    pub directory: Option<PathBuf>,
    pub new_directory: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Clone, Debug)]
pub struct ActivateRequest {
    pub name: String,
    pub shell: Shell,
    pub directory: Option<PathBuf>,
}

/// Resolve the environment name and the root it lives in. `.` maps to
/// `.venv` in the working directory unless a root was given explicitly.
pub fn locate(ctx: &CommandContext, name: &str, directory: Option<&Path>) -> (String, PathBuf) {
    if name == LOCAL_ENV_ALIAS {
        let root = directory.map_or_else(|| ctx.cwd().to_path_buf(), Path::to_path_buf);
        return (LOCAL_ENV_NAME.to_string(), root);
    }
    let root = directory.map_or_else(|| ctx.config().root().to_path_buf(), Path::to_path_buf);
    (name.to_string(), root)
}

pub fn list(ctx: &CommandContext, request: &ListRequest) -> ExecutionOutcome {
    let root = request
        .directory
        .clone()
        .unwrap_or_else(|| ctx.config().root().to_path_buf());
    let envs = match environment::list(&root) {
        Ok(envs) => envs,
        Err(err) => return ExecutionOutcome::from_env_error(&err),
    };
    let rows = envs
        .iter()
        .map(|env| list_row(env, request))
        .collect::<Vec<_>>();
    ExecutionOutcome::success(
        format!("Found {} environments.", rows.len()),
        json!({
            "root": root.display().to_string(),
            "count": rows.len(),
            "size": request.size,
            "full_version": request.full_version,
            "environments": rows,
        }),
    )
}

fn list_row(env: &Environment, request: &ListRequest) -> Value {
    let full_version = env.full_version();
    if let Err(err) = &full_version {
        tracing::debug!(env = %env.name(), %err, "falling back to runtime version");
    }
    let version = match &full_version {
        Ok(full) if request.full_version => full.to_string(),
        Ok(full) => full.version_segment().to_string(),
        Err(_) => env.version().to_string(),
    };
    let mut row = json!({
        "name": env.name(),
        "version": version,
        "runtime_version": env.version(),
        "full_version": full_version.ok(),
        "path": env.path().display().to_string(),
    });
    if request.size {
        let bytes = env.size();
        row["size_bytes"] = json!(bytes);
        row["size"] = json!(uvn_domain::format_bytes(bytes));
    }
    row
}

pub fn create(ctx: &CommandContext, request: &CreateRequest) -> ExecutionOutcome {
    let (name, root) = locate(ctx, &request.name, request.directory.as_deref());
    let options = CreateOptions {
        python: request.python.clone(),
        link_mode: request.link_mode,
        quiet: request.quiet,
    };
    match environment::create(&name, &root, &options, &ctx.uv()) {
        Ok(env) => ExecutionOutcome::success(
            format!("Environment `{name}` created."),
            env_details(&env),
        ),
        Err(err) => ExecutionOutcome::from_env_error(&err),
    }
}

pub fn remove(ctx: &CommandContext, request: &RemoveRequest) -> ExecutionOutcome {
    let (name, root) = locate(ctx, &request.name, request.directory.as_deref());
    let mut corrupted = false;
    let removed = match environment::remove(&name, &root, !request.force) {
        Ok(removed) => removed,
        Err(EnvError::Missing { .. }) => false,
        Err(EnvError::Corrupted { .. }) => {
            corrupted = true;
            false
        }
        Err(err) => return ExecutionOutcome::from_env_error(&err),
    };
    let message = format!(
        "Environment `{name}` was{} removed!",
        if removed { "" } else { " not" }
    );
    let mut details = json!({
        "name": name,
        "path": root.join(&name).display().to_string(),
        "removed": removed,
        "forced": request.force,
    });
    if corrupted {
        details["reason"] = json!("corrupted");
        details["hint"] = json!("It appears to be corrupted, use --force to remove it anyways.");
    }
    if removed || request.force {
        ExecutionOutcome::success(message, details)
    } else {
        ExecutionOutcome::user_error(message, details)
    }
}

pub fn export(ctx: &CommandContext, request: &ExportRequest) -> ExecutionOutcome {
    let (name, root) = locate(ctx, &request.name, request.directory.as_deref());
    let env = match Environment::open(root.join(&name)) {
        Ok(env) => env,
        Err(err) => return ExecutionOutcome::from_env_error(&err),
    };
    let options = ExportOptions::new(!request.short, !request.lower);
    let quiet = !request.verbose;
    let uv = ctx.uv();

    if let Some(format) = ExportFormat::from_bare_name(&request.target) {
        return match export::render(&env, &format, None, options, quiet, &uv) {
            Ok(content) => ExecutionOutcome::success(
                String::new(),
                json!({
                    "name": name,
                    "format": format,
                    "content": content,
                }),
            ),
            Err(err) => ExecutionOutcome::from_env_error(&err),
        };
    }

    let target = absolute_target(ctx, Path::new(&request.target));
    let format = ExportFormat::from_path(&target);
    match export::export(&env, &target, options, quiet, &uv) {
        Ok(true) => ExecutionOutcome::success(
            format!("Exported `{name}` to {}", target.display()),
            json!({
                "name": name,
                "format": format,
                "path": target.display().to_string(),
                "complete": true,
            }),
        ),
        Ok(false) => ExecutionOutcome::failure(
            format!("Export of `{name}` to {} is incomplete", target.display()),
            json!({
                "name": name,
                "format": format,
                "path": target.display().to_string(),
                "complete": false,
                "reason": "size-mismatch",
            }),
        ),
        Err(err) => ExecutionOutcome::from_env_error(&err),
    }
}

pub fn fork(ctx: &CommandContext, request: &ForkRequest) -> ExecutionOutcome {
    // The destination root follows `-d` as given, before `.` is resolved.
    let new_root = request
        .new_directory
        .clone()
        .or_else(|| request.directory.clone())
        .unwrap_or_else(|| ctx.config().root().to_path_buf());
    let (name, root) = locate(ctx, &request.name, request.directory.as_deref());
    let Ok(source) = Environment::open(root.join(&name)) else {
        return not_found(&name);
    };
    match source.fork(
        &request.new_name,
        &new_root,
        request.link_mode,
        request.quiet,
        &ctx.uv(),
    ) {
        Ok(forked) => {
            let mut details = env_details(&forked);
            details["source"] = json!(source.path().display().to_string());
            ExecutionOutcome::success(
                format!("Environment `{name}` forked to `{}`.", request.new_name),
                details,
            )
        }
        Err(err) => ExecutionOutcome::from_env_error(&err),
    }
}

pub fn activate(ctx: &CommandContext, request: &ActivateRequest) -> ExecutionOutcome {
    let (name, root) = locate(ctx, &request.name, request.directory.as_deref());
    match Environment::open(root.join(&name)) {
        Ok(env) => {
            let command = env.activate(request.shell);
            ExecutionOutcome::success(
                command.clone(),
                json!({
                    "name": name,
                    "shell": request.shell,
                    "command": command,
                }),
            )
        }
        Err(_) => not_found(&name),
    }
}

fn not_found(name: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("Environment `{name}` not found!"),
        json!({ "name": name, "reason": "missing" }),
    )
}

fn env_details(env: &Environment) -> Value {
    json!({
        "name": env.name(),
        "path": env.path().display().to_string(),
        "version": env.version(),
        "full_version": env.full_version().ok(),
    })
}

fn absolute_target(ctx: &CommandContext, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        ctx.cwd().join(target)
    }
}
