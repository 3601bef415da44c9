//! Rendering capability used to convert diagram files.
//!
//! The actual conversion is done by an external program: either the draw.io
//! desktop CLI installed on the host or a container image bundling it. This
//! module builds the command line for each export and runs it to completion.

mod command;
mod container;
mod local;

pub use command::run_to_completion;
pub use container::ContainerRenderer;
pub use local::{LocalRenderer, display_available, needs_virtual_display};

use crate::config::{Config, ExportFormat, RenderMode};
use crate::error::Result;
use std::path::Path;

/// A single conversion of one diagram to one format.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Diagram file to export.
    pub input: &'a Path,
    /// Target format.
    pub format: ExportFormat,
    /// Destination file path.
    pub destination: &'a Path,
}

/// An external program able to export diagram files.
pub trait Renderer: Send + Sync {
    /// Short human-readable name used in log output.
    fn name(&self) -> &str;

    /// Verify that the program can be invoked on this host.
    fn check_available(&self) -> Result<()>;

    /// Export one diagram, blocking until the program exits.
    fn render(&self, request: &RenderRequest<'_>) -> Result<()>;
}

/// Build the renderer selected by `mode`.
///
/// `working_dir` is the default container mount root.
pub fn build_renderer(
    mode: RenderMode,
    config: &Config,
    working_dir: &Path,
) -> Result<Box<dyn Renderer>> {
    match mode {
        RenderMode::Local => Ok(Box::new(LocalRenderer::from_config(&config.local))),
        RenderMode::Container => Ok(Box::new(ContainerRenderer::from_config(
            &config.container,
            working_dir,
        )?)),
    }
}
