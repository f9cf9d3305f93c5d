//! Thin wrapper around the `uv` executable.

use std::path::Path;

use uvn_domain::{LinkMode, RequirementSource};

use crate::error::{EnvError, EnvResult};
use crate::process::{Invocation, OutputMode, RunOutput};

/// Arguments of `uv venv` beyond the target path.
#[derive(Debug, Clone, Default)]
pub struct VenvOptions<'a> {
    pub python: Option<&'a str>,
    pub link_mode: Option<LinkMode>,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct UvTool {
    program: String,
}

impl UvTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub(crate) fn venv_invocation(&self, path: &Path, options: &VenvOptions<'_>) -> Invocation {
        let mut invocation = Invocation::new(&self.program).args([
            "venv",
            "--no-project",
            "--no-config",
            "--python-preference",
            "only-managed",
        ]);
        if let Some(python) = options.python {
            invocation = invocation.args(["--python", python]);
        }
        if let Some(mode) = options.link_mode {
            invocation = invocation.args(["--link-mode", mode.as_ref()]);
        }
        if options.quiet {
            invocation = invocation.arg("--quiet");
        }
        invocation.arg(path.display().to_string())
    }

    pub fn venv(&self, path: &Path, options: &VenvOptions<'_>) -> EnvResult<()> {
        let output = self.execute(self.venv_invocation(path, options), OutputMode::Stream)?;
        ensure_success(&output, || format!("uv venv failed for {}", path.display()))
    }

    /// Package listing of the environment at `env`, as printed by `uv pip`.
    pub fn pip_listing(&self, env: &Path, source: RequirementSource) -> EnvResult<String> {
        let invocation = Invocation::new(&self.program)
            .arg("pip")
            .args(source.pip_args().iter().copied())
            .env("VIRTUAL_ENV", env.display().to_string());
        let output = self.execute(invocation, OutputMode::Capture)?;
        ensure_success(&output, || {
            format!(
                "uv pip {} failed for {}",
                source.pip_args().join(" "),
                env.display()
            )
        })?;
        Ok(output.stdout)
    }

    pub fn pip_install(&self, env: &Path, requirements: &Path, quiet: bool) -> EnvResult<()> {
        let mut invocation = Invocation::new(&self.program)
            .args(["pip", "install", "-r"])
            .arg(requirements.display().to_string())
            .env("VIRTUAL_ENV", env.display().to_string());
        if quiet {
            invocation = invocation.arg("--quiet");
        }
        let output = self.execute(invocation, OutputMode::Stream)?;
        ensure_success(&output, || {
            format!("uv pip install failed for {}", env.display())
        })
    }

    /// Resolve the project in `directory`, leaving `uv.lock` next to it.
    pub fn lock(&self, directory: &Path, quiet: bool) -> EnvResult<()> {
        let mut invocation = Invocation::new(&self.program)
            .args(["lock", "--directory"])
            .arg(directory.display().to_string());
        if quiet {
            invocation = invocation.arg("--quiet");
        }
        // uv's own progress goes to stderr; stdout carries exported text.
        let output = self.execute(invocation, OutputMode::Capture)?;
        if !quiet && !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
        ensure_success(&output, || {
            format!("uv lock failed in {}", directory.display())
        })
    }

    fn execute(&self, invocation: Invocation, mode: OutputMode) -> EnvResult<RunOutput> {
        invocation
            .run(mode)
            .map_err(|err| EnvError::uv(format!("{err:#}"), String::new()))
    }
}

fn ensure_success(output: &RunOutput, message: impl FnOnce() -> String) -> EnvResult<()> {
    if output.success() {
        Ok(())
    } else {
        Err(EnvError::uv(
            format!("{} (exit code {})", message(), output.code),
            output.stderr.clone(),
        ))
    }
}
