//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "drawio-batch";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extension of diagram files picked up from the source tree.
pub const DIAGRAM_EXTENSION: &str = "drawio";

/// Default source directory, relative to the working directory.
pub const DEFAULT_SOURCE_DIR: &str = "diagrams";

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Default number of files exported concurrently.
pub const DEFAULT_JOBS: usize = 1;

/// Upper bound for `--jobs`.
///
/// Every job spawns a full renderer process (an Electron app for the local
/// draw.io CLI), so large values only thrash the host.
pub const MAX_JOBS: usize = 64;

/// Maximum number of stderr lines from a failed renderer kept in the error.
pub const STDERR_TAIL_LINES: usize = 20;

/// Local renderer defaults.
pub mod local {
    /// draw.io desktop binary.
    pub const DEFAULT_BINARY: &str = "drawio";

    /// Virtual display wrapper used when no display server is available.
    pub const XVFB_RUN: &str = "xvfb-run";

    /// Arguments passed to `xvfb-run` before the wrapped command.
    pub const XVFB_ARGS: &[&str] = &["-a"];

    /// Environment variables that indicate a running display server.
    pub const DISPLAY_VARS: &[&str] = &["DISPLAY", "WAYLAND_DISPLAY"];
}

/// Container renderer defaults.
pub mod container {
    /// Container runtime binary.
    pub const DEFAULT_RUNTIME: &str = "docker";

    /// Image bundling draw.io with a headless display.
    pub const DEFAULT_IMAGE: &str = "rlespinasse/drawio-export";

    /// Directory inside the container where the mount root is mounted.
    pub const DEFAULT_MOUNT_POINT: &str = "/data";

    /// Extra arguments passed to the image by default.
    ///
    /// Keeps output names equal to the input stem for single-page diagrams.
    pub const DEFAULT_EXTRA_ARGS: &[&str] = &["--remove-page-suffix"];
}
