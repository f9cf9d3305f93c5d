use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uvn_core::config::expand_home;
use uvn_domain::{LinkMode, Shell};

#[derive(Parser, Debug)]
#[command(
    name = "uvn",
    version,
    about = "uvn is conda for uv; a centralized Python virtual environment manager.",
    disable_help_subcommand = true,
    infer_subcommands = true,
    arg_required_else_help = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct UvnCli {
    #[arg(long, help = "Emit {status,message,details} JSON envelopes", global = true)]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(long, help = "Enable debug logging on stderr", global = true)]
    pub debug: bool,
    #[arg(long, help = "Enable trace logging on stderr", global = true)]
    pub trace: bool,
    #[command(subcommand)]
    pub command: CommandCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    /// List all virtual environments.
    List(ListArgs),
    /// Create a virtual environment.
    Create(CreateArgs),
    /// Remove a virtual environment.
    Remove(RemoveArgs),
    /// Export a virtual environment.
    Export(ExportArgs),
    /// Copy a virtual environment.
    Fork(ForkArgs),
    /// Show environment command.
    Activate(ActivateArgs),
    /// Show uvn version.
    Version,
}

impl CommandCli {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Create(_) => "create",
            Self::Remove(_) => "remove",
            Self::Export(_) => "export",
            Self::Fork(_) => "fork",
            Self::Activate(_) => "activate",
            Self::Version => "version",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DirectoryArg {
    #[arg(
        short = 'd',
        long = "directory",
        value_name = "DIR",
        value_parser = parse_directory,
        help = "Root directory for virtual environments [default: $UVN_DIR or ~/.virtualenvs]"
    )]
    pub directory: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(short, long, help = "Show the sizes of the environments")]
    pub size: bool,
    #[arg(short, long, help = "Show the full versions of the environments")]
    pub full_version: bool,
    #[command(flatten)]
    pub root: DirectoryArg,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(value_name = "ENV_NAME", help = "The name of the virtual environment")]
    pub name: String,
    #[arg(
        short,
        long,
        env = "UV_PYTHON",
        help = "The Python interpreter to use for the virtual environment"
    )]
    pub python: Option<String>,
    #[command(flatten)]
    pub link: LinkModeArg,
    #[command(flatten)]
    pub root: DirectoryArg,
    #[arg(short, long, help = "Do not print any output")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "ENV_NAME", help = "The name of the virtual environment")]
    pub name: String,
    #[arg(short, long, help = "Delete environment path even if corrupted")]
    pub force: bool,
    #[command(flatten)]
    pub root: DirectoryArg,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_name = "ENV_NAME", help = "The name of the virtual environment")]
    pub name: String,
    #[arg(
        value_name = "TARGET",
        default_value = "txt",
        help = "Path to file or one of [txt|toml|py|lock]"
    )]
    pub target: String,
    #[arg(short, long, help = "Export only top-level packages")]
    pub short: bool,
    #[arg(short, long, help = "Use '>=' instead of '==' for version specifiers")]
    pub lower: bool,
    #[command(flatten)]
    pub root: DirectoryArg,
    #[arg(short, long, help = "Show progress when generating lock file")]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct ForkArgs {
    #[arg(value_name = "ENV_NAME", help = "The name of the virtual environment")]
    pub name: String,
    #[arg(value_name = "NEW_NAME", help = "The name of the new environment")]
    pub new_name: String,
    #[command(flatten)]
    pub link: LinkModeArg,
    #[command(flatten)]
    pub root: DirectoryArg,
    #[arg(
        short = 'n',
        long = "new-directory",
        value_name = "DIR",
        value_parser = parse_directory,
        help = "Root directory for the new environment (defaults to --directory)"
    )]
    pub new_directory: Option<PathBuf>,
    #[arg(short, long, help = "Do not print any output")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct ActivateArgs {
    #[arg(value_name = "ENV_NAME", help = "The name of the virtual environment")]
    pub name: String,
    #[arg(
        short,
        long,
        value_parser = parse_shell,
        help = "Shell name (auto-detected by default)"
    )]
    pub shell: Option<Shell>,
    #[command(flatten)]
    pub root: DirectoryArg,
    #[arg(short, long, help = "Do not print any output")]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LinkModeArg {
    #[arg(
        short = 'l',
        long = "link-mode",
        env = "UV_LINK_MODE",
        value_parser = parse_link_mode,
        help = "The method to use when installing packages from the global cache"
    )]
    pub link_mode: Option<LinkMode>,
}

fn parse_directory(raw: &str) -> Result<PathBuf, String> {
    if raw.trim().is_empty() {
        return Err("directory must not be empty".to_string());
    }
    Ok(expand_home(raw))
}

fn parse_link_mode(raw: &str) -> Result<LinkMode, String> {
    raw.parse::<LinkMode>()
        .map_err(|_| format!("unknown link mode `{raw}` (expected clone, copy, hardlink or symlink)"))
}

fn parse_shell(raw: &str) -> Result<Shell, String> {
    raw.parse::<Shell>()
        .map_err(|_| format!("unknown shell `{raw}` (expected one of {})", Shell::names().join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        UvnCli::command().debug_assert();
    }

    #[test]
    fn unique_prefixes_select_subcommands() {
        let cli = UvnCli::try_parse_from(["uvn", "l", "-s"]).expect("parse");
        assert!(matches!(cli.command, CommandCli::List(ListArgs { size: true, .. })));
        let cli = UvnCli::try_parse_from(["uvn", "ex", "data", "lock"]).expect("parse");
        match cli.command {
            CommandCli::Export(args) => assert_eq!(args.target, "lock"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_target_defaults_to_txt() {
        let cli = UvnCli::try_parse_from(["uvn", "export", "data", "-s", "-l"]).expect("parse");
        match cli.command {
            CommandCli::Export(args) => {
                assert_eq!(args.target, "txt");
                assert!(args.short && args.lower);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn activate_rejects_unknown_shells() {
        let err = UvnCli::try_parse_from(["uvn", "activate", "data", "-s", "xonsh"]).unwrap_err();
        assert!(err.to_string().contains("unknown shell"));
        let cli = UvnCli::try_parse_from(["uvn", "activate", "data", "-s", "nu"]).expect("parse");
        match cli.command {
            CommandCli::Activate(args) => assert_eq!(args.shell, Some(Shell::Nu)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fork_accepts_link_mode_and_new_directory() {
        let cli = UvnCli::try_parse_from([
            "uvn", "fork", "data", "copy", "-l", "copy", "-n", "/srv/envs", "-q",
        ])
        .expect("parse");
        match cli.command {
            CommandCli::Fork(args) => {
                assert_eq!(args.link.link_mode, Some(LinkMode::Copy));
                assert_eq!(args.new_directory, Some(PathBuf::from("/srv/envs")));
                assert!(args.quiet);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
