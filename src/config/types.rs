//! Configuration type definitions.

use crate::constants::{
    DEFAULT_JOBS, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR, container, local,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default export settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Locally installed renderer settings.
    #[serde(default)]
    pub local: LocalConfig,

    /// Containerized renderer settings.
    #[serde(default)]
    pub container: ContainerConfig,
}

/// Default export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Directory holding the diagram tree.
    pub source_dir: PathBuf,

    /// Root of the generated export tree.
    pub output_dir: PathBuf,

    /// Formats to export every diagram to.
    pub formats: Vec<ExportFormat>,

    /// Number of files exported concurrently.
    pub jobs: usize,

    /// Which rendering capability to use.
    pub mode: RenderMode,

    /// Continue past failed exports and report them at the end.
    pub keep_going: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: vec![ExportFormat::Png, ExportFormat::Pdf],
            jobs: DEFAULT_JOBS,
            mode: RenderMode::Local,
            keep_going: false,
        }
    }
}

/// Rendering capability selector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// draw.io CLI installed on the host.
    #[default]
    Local,
    /// draw.io packaged in a container image.
    Container,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// When to wrap the local renderer in a virtual display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum XvfbMode {
    /// Wrap only when no display server is detected.
    #[default]
    Auto,
    /// Always wrap.
    Always,
    /// Never wrap.
    Never,
}

/// Local renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// draw.io binary name or path.
    pub binary: String,

    /// Virtual display policy.
    pub xvfb: XvfbMode,

    /// Extra arguments appended after the export flags.
    pub extra_args: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            binary: local::DEFAULT_BINARY.to_string(),
            xvfb: XvfbMode::Auto,
            extra_args: Vec::new(),
        }
    }
}

/// Container renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Container runtime binary (docker, podman).
    pub runtime: String,

    /// Image that performs the export.
    pub image: String,

    /// Mount point of the mount root inside the container.
    pub mount_point: String,

    /// Host directory mounted into the container (default: working directory).
    pub mount_root: Option<PathBuf>,

    /// Extra arguments passed to the image.
    pub extra_args: Vec<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: container::DEFAULT_RUNTIME.to_string(),
            image: container::DEFAULT_IMAGE.to_string(),
            mount_point: container::DEFAULT_MOUNT_POINT.to_string(),
            mount_root: None,
            extra_args: container::DEFAULT_EXTRA_ARGS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG raster image.
    Png,
    /// PDF document.
    Pdf,
    /// SVG vector image.
    Svg,
    /// JPEG raster image.
    Jpg,
}

impl ExportFormat {
    /// Format selector passed to the renderer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Jpg => "jpg",
        }
    }

    /// File extension of exported files.
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Name of this format's subtree under the output root.
    pub const fn dir_name(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("png".parse::<ExportFormat>().ok(), Some(ExportFormat::Png));
        assert_eq!("PDF".parse::<ExportFormat>().ok(), Some(ExportFormat::Pdf));
        assert_eq!("jpeg".parse::<ExportFormat>().ok(), Some(ExportFormat::Jpg));
        assert!("vsdx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(ExportFormat::Png.to_string(), "png");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Svg.dir_name(), "svg");
    }

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.source_dir, PathBuf::from("diagrams"));
        assert_eq!(defaults.output_dir, PathBuf::from("build"));
        assert_eq!(defaults.formats, vec![ExportFormat::Png, ExportFormat::Pdf]);
        assert_eq!(defaults.jobs, 1);
        assert_eq!(defaults.mode, RenderMode::Local);
        assert!(!defaults.keep_going);
    }

    #[test]
    fn test_container_defaults() {
        let container = ContainerConfig::default();
        assert_eq!(container.runtime, "docker");
        assert_eq!(container.mount_point, "/data");
        assert!(container.mount_root.is_none());
    }
}
