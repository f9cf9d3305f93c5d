#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod export;
pub mod outcome;
pub mod process;
pub mod uv;

#[cfg(all(test, unix))]
pub(crate) mod testing;

pub use commands::{
    ActivateRequest, CreateRequest, ExportRequest, ForkRequest, ListRequest, RemoveRequest,
};
pub use config::{CommandContext, Config, EnvSnapshot, GlobalOptions};
pub use environment::{CreateOptions, EnvState, Environment};
pub use error::{EnvError, EnvResult};
pub use outcome::{to_json_response, CommandStatus, ExecutionOutcome};
pub use uv::{UvTool, VenvOptions};
