#![deny(clippy::all)]

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
use uvn_core::{CommandContext, GlobalOptions};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::{CommandCli, UvnCli};
use output::OutputOptions;

const LOG_ENV: &str = "UVN_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = UvnCli::parse();
    init_tracing(cli.trace, cli.debug);

    let global = GlobalOptions {
        json: cli.json,
        no_color: cli.no_color,
        debug: cli.debug,
        trace: cli.trace,
    };
    let ctx = CommandContext::new(&global)?;
    tracing::debug!(
        command = cli.command.name(),
        root = %ctx.config().root().display(),
        uv = ctx.config().uv_program(),
        "dispatching"
    );

    let outcome = dispatch::dispatch_command(&ctx, &cli.command);
    let opts = OutputOptions {
        json: cli.json,
        no_color: cli.no_color,
        quiet: quiet_requested(&cli.command),
    };
    let code = output::emit_output(&opts, &cli.command, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn quiet_requested(command: &CommandCli) -> bool {
    match command {
        CommandCli::Create(args) => args.quiet,
        CommandCli::Fork(args) => args.quiet,
        CommandCli::Activate(args) => args.quiet,
        _ => false,
    }
}

fn init_tracing(trace: bool, debug: bool) {
    let level = if trace {
        "trace"
    } else if debug {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(format!("uvn={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
