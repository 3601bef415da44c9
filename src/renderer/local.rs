//! draw.io desktop CLI installed on the host.

use super::command::{resolve_program, run_to_completion};
use super::{RenderRequest, Renderer};
use crate::config::{LocalConfig, XvfbMode};
use crate::constants::local::{DISPLAY_VARS, XVFB_ARGS, XVFB_RUN};
use crate::error::Result;
use std::ffi::OsString;
use tracing::debug;

/// Renderer invoking the draw.io binary directly, one process per export.
///
/// Runs `drawio --export --format <fmt> --output <dest> [extra..] <input>`,
/// wrapped in `xvfb-run -a` when no display server is available.
#[derive(Debug, Clone)]
pub struct LocalRenderer {
    binary: String,
    use_xvfb: bool,
    extra_args: Vec<String>,
}

impl LocalRenderer {
    /// Create a renderer from configuration, probing for a display server.
    pub fn from_config(config: &LocalConfig) -> Self {
        let use_xvfb = needs_virtual_display(config.xvfb, display_available());
        if use_xvfb {
            debug!("No display server detected, wrapping renderer in {XVFB_RUN}");
        }
        Self::new(config.binary.clone(), use_xvfb, config.extra_args.clone())
    }

    /// Create a renderer with explicit settings.
    pub fn new(binary: String, use_xvfb: bool, extra_args: Vec<String>) -> Self {
        Self {
            binary,
            use_xvfb,
            extra_args,
        }
    }

    /// Program and arguments for one export.
    pub fn command_line(&self, request: &RenderRequest<'_>) -> (String, Vec<OsString>) {
        let mut args: Vec<OsString> = Vec::new();
        let program = if self.use_xvfb {
            args.extend(XVFB_ARGS.iter().map(OsString::from));
            args.push(OsString::from(&self.binary));
            XVFB_RUN.to_string()
        } else {
            self.binary.clone()
        };

        args.push("--export".into());
        args.push("--format".into());
        args.push(request.format.as_str().into());
        args.push("--output".into());
        args.push(request.destination.as_os_str().to_os_string());
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(request.input.as_os_str().to_os_string());

        (program, args)
    }
}

impl Renderer for LocalRenderer {
    fn name(&self) -> &str {
        &self.binary
    }

    fn check_available(&self) -> Result<()> {
        let path = resolve_program(&self.binary)?;
        debug!("Using renderer: {}", path.display());
        if self.use_xvfb {
            resolve_program(XVFB_RUN)?;
        }
        Ok(())
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        let (program, args) = self.command_line(request);
        run_to_completion(&program, &args, request)
    }
}

/// Whether a display server is reachable from this process.
///
/// Windows and macOS always have one; elsewhere an X11 or Wayland display
/// variable must be set.
pub fn display_available() -> bool {
    if cfg!(any(windows, target_os = "macos")) {
        return true;
    }
    DISPLAY_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

/// Decide whether to wrap the renderer in a virtual display.
pub const fn needs_virtual_display(mode: XvfbMode, display_available: bool) -> bool {
    match mode {
        XvfbMode::Auto => !display_available,
        XvfbMode::Always => true,
        XvfbMode::Never => false,
    }
}
