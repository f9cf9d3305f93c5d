#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod format;
pub mod full_version;
pub mod layout;
pub mod metadata;
pub mod requirements;
pub mod shell;

pub use format::ExportFormat;
pub use full_version::{FullVersion, FullVersionError, FREE_THREADED_MARKER};
pub use layout::{
    format_bytes, full_version_component, interpreter_path, interpreter_relative_path, LinkMode,
};
pub use metadata::{
    merge_script_metadata, render_dependencies, render_pyproject, strip_script_metadata,
    SCRIPT_RUNNER,
};
pub use requirements::{
    render_requirements, requirement_lines, ExportOptions, RequirementSource,
};
pub use shell::Shell;
