use std::env;
use std::path::Path;

use serde_json::json;
use uvn_core::{
    commands, ActivateRequest, CommandContext, CreateRequest, ExecutionOutcome, ExportRequest,
    ForkRequest, ListRequest, RemoveRequest,
};
use uvn_domain::Shell;

use crate::cli::{ActivateArgs, CommandCli};

pub fn dispatch_command(ctx: &CommandContext, command: &CommandCli) -> ExecutionOutcome {
    match command {
        CommandCli::List(args) => commands::list(
            ctx,
            &ListRequest {
                directory: args.root.directory.clone(),
                size: args.size,
                full_version: args.full_version,
            },
        ),
        CommandCli::Create(args) => commands::create(
            ctx,
            &CreateRequest {
                name: args.name.clone(),
                python: args.python.clone(),
                link_mode: args.link.link_mode,
                directory: args.root.directory.clone(),
                quiet: args.quiet,
            },
        ),
        CommandCli::Remove(args) => commands::remove(
            ctx,
            &RemoveRequest {
                name: args.name.clone(),
                force: args.force,
                directory: args.root.directory.clone(),
            },
        ),
        CommandCli::Export(args) => commands::export(
            ctx,
            &ExportRequest {
                name: args.name.clone(),
                target: args.target.clone(),
                short: args.short,
                lower: args.lower,
                directory: args.root.directory.clone(),
                verbose: args.verbose,
            },
        ),
        CommandCli::Fork(args) => commands::fork(
            ctx,
            &ForkRequest {
                name: args.name.clone(),
                new_name: args.new_name.clone(),
                link_mode: args.link.link_mode,
                directory: args.root.directory.clone(),
                new_directory: args.new_directory.clone(),
                quiet: args.quiet,
            },
        ),
        CommandCli::Activate(args) => activate(ctx, args),
        CommandCli::Version => ExecutionOutcome::success(
            env!("CARGO_PKG_VERSION"),
            json!({ "version": env!("CARGO_PKG_VERSION") }),
        ),
    }
}

fn activate(ctx: &CommandContext, args: &ActivateArgs) -> ExecutionOutcome {
    let shell = match args.shell {
        Some(shell) => shell,
        None => {
            let detected = detect_shell();
            match detected.parse::<Shell>() {
                Ok(shell) => shell,
                Err(_) => {
                    return ExecutionOutcome::user_error(
                        format!(
                            "Detected unknown shell `{detected}` not in [{}]",
                            Shell::names().join(", ")
                        ),
                        json!({ "reason": "unknown-shell", "shell": detected }),
                    )
                }
            }
        }
    };
    tracing::debug!(%shell, "activating");
    commands::activate(
        ctx,
        &ActivateRequest {
            name: args.name.clone(),
            shell,
            directory: args.root.directory.clone(),
        },
    )
}

/// Best-effort name of the user's shell from the environment.
fn detect_shell() -> String {
    if let Some(shell) = env::var_os("SHELL").filter(|value| !value.is_empty()) {
        return shell_name(Path::new(&shell));
    }
    if cfg!(windows) {
        if env::var_os("PSModulePath").is_some() {
            return "powershell".to_string();
        }
        return "cmd".to_string();
    }
    "unknown".to_string()
}

fn shell_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
