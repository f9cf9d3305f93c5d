//! Dependency export: requirements lists, inline script metadata, project
//! manifests and lock files.

use std::fs;
use std::path::Path;

use uvn_domain::{
    merge_script_metadata, render_dependencies, render_pyproject, render_requirements,
    ExportFormat, ExportOptions,
};

use crate::environment::Environment;
use crate::error::{EnvError, EnvResult};
use crate::uv::UvTool;

pub fn requirements(env: &Environment, options: ExportOptions, uv: &UvTool) -> EnvResult<String> {
    let full_version = env.full_version()?;
    let listing = uv.pip_listing(env.path(), options.source())?;
    Ok(render_requirements(full_version.as_str(), &listing, options))
}

/// `requires-python` plus the `dependencies` array, as TOML lines.
pub fn dependencies(env: &Environment, options: ExportOptions, uv: &UvTool) -> EnvResult<String> {
    let full_version = env.full_version()?;
    let requirements = requirements(env, options, uv)?;
    Ok(render_dependencies(
        &requirements,
        &full_version,
        env.version(),
        options.exact,
    ))
}

pub fn pyproject(
    env: &Environment,
    existing: Option<&str>,
    options: ExportOptions,
    uv: &UvTool,
) -> EnvResult<String> {
    if existing.is_some_and(|text| !text.is_empty()) {
        return Err(EnvError::Feature(
            "updating an existing pyproject.toml is not supported".to_string(),
        ));
    }
    Ok(render_pyproject(env.name(), &dependencies(env, options, uv)?))
}

pub fn script_metadata(
    env: &Environment,
    existing: Option<&str>,
    options: ExportOptions,
    uv: &UvTool,
) -> EnvResult<String> {
    let dependencies = dependencies(env, options, uv)?;
    Ok(merge_script_metadata(existing.unwrap_or_default(), &dependencies))
}

/// Resolve the environment's exact packages with `uv lock` in a scratch
/// project and return the lock file.
pub fn lock(env: &Environment, quiet: bool, uv: &UvTool) -> EnvResult<String> {
    let manifest = pyproject(env, None, ExportOptions::pinned(), uv)?;
    let scratch = tempfile::Builder::new()
        .prefix("uvn-lock-")
        .tempdir()
        .map_err(|err| EnvError::io("create a scratch project", err))?;
    fs::write(scratch.path().join("pyproject.toml"), manifest)
        .map_err(|err| EnvError::io("write the scratch pyproject.toml", err))?;
    uv.lock(scratch.path(), quiet)?;
    let lock_path = scratch.path().join("uv.lock");
    fs::read_to_string(&lock_path)
        .map_err(|err| EnvError::io(format!("read {}", lock_path.display()), err))
}

pub fn render(
    env: &Environment,
    format: &ExportFormat,
    existing: Option<&str>,
    options: ExportOptions,
    quiet: bool,
    uv: &UvTool,
) -> EnvResult<String> {
    match format {
        ExportFormat::Requirements => requirements(env, options, uv),
        ExportFormat::ScriptMetadata => script_metadata(env, existing, options, uv),
        ExportFormat::Manifest => pyproject(env, existing, options, uv),
        ExportFormat::Lock => lock(env, quiet, uv),
        ExportFormat::Unrecognized(_) => Err(EnvError::Feature(format!(
            "cannot export to {format}; use a .txt, .py, .toml or .lock target"
        ))),
    }
}

/// Write the export for `target`, picking the format from its extension.
///
/// Returns whether the file on disk has the length of the rendered text.
pub fn export(
    env: &Environment,
    target: &Path,
    options: ExportOptions,
    quiet: bool,
    uv: &UvTool,
) -> EnvResult<bool> {
    let format = ExportFormat::from_path(target);
    let existing = if format.reads_existing() && target.is_file() {
        Some(
            fs::read_to_string(target)
                .map_err(|err| EnvError::io(format!("read {}", target.display()), err))?,
        )
    } else {
        None
    };
    let text = render(env, &format, existing.as_deref(), options, quiet, uv)?;
    fs::write(target, &text)
        .map_err(|err| EnvError::io(format!("write {}", target.display()), err))?;
    let written = fs::metadata(target)
        .map_err(|err| EnvError::io(format!("inspect {}", target.display()), err))?
        .len();
    let complete = written == text.len() as u64;
    if !complete {
        tracing::warn!(
            target = %target.display(),
            written,
            expected = text.len(),
            "export size mismatch"
        );
    }
    Ok(complete)
}
