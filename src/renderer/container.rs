//! draw.io packaged in a container image.

use super::command::{resolve_program, run_to_completion};
use super::{RenderRequest, Renderer};
use crate::config::ContainerConfig;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Renderer running one container per export.
///
/// The mount root is bind-mounted at the mount point and used as the working
/// directory; input and destination directory are translated to their
/// in-container paths.
#[derive(Debug, Clone)]
pub struct ContainerRenderer {
    runtime: String,
    image: String,
    mount_root: PathBuf,
    mount_point: String,
    extra_args: Vec<String>,
}

impl ContainerRenderer {
    /// Create a renderer from configuration.
    ///
    /// `working_dir` is mounted when no mount root is configured.
    pub fn from_config(config: &ContainerConfig, working_dir: &Path) -> Result<Self> {
        let mount_root = config
            .mount_root
            .as_deref()
            .map_or_else(|| working_dir.to_path_buf(), |root| working_dir.join(root));
        let mount_root = std::path::absolute(&mount_root)?;

        Ok(Self {
            runtime: config.runtime.clone(),
            image: config.image.clone(),
            mount_root,
            mount_point: config.mount_point.trim_end_matches('/').to_string(),
            extra_args: config.extra_args.clone(),
        })
    }

    /// Translate a host path into the container's view of it.
    pub fn container_path(&self, host: &Path) -> Result<String> {
        let absolute = std::path::absolute(host)?;
        let relative = absolute
            .strip_prefix(&self.mount_root)
            .map_err(|_| Error::OutsideMountRoot {
                path: host.to_path_buf(),
                mount_root: self.mount_root.clone(),
            })?;

        let mut path = self.mount_point.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    path.push('/');
                    path.push_str(&part.to_string_lossy());
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::OutsideMountRoot {
                        path: host.to_path_buf(),
                        mount_root: self.mount_root.clone(),
                    });
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Program and arguments for one export.
    pub fn command_line(&self, request: &RenderRequest<'_>) -> Result<(String, Vec<OsString>)> {
        let destination_dir = request.destination.parent().unwrap_or_else(|| Path::new("."));
        let input = self.container_path(request.input)?;
        let output = self.container_path(destination_dir)?;

        let mut volume = self.mount_root.as_os_str().to_os_string();
        volume.push(":");
        volume.push(&self.mount_point);

        let mut args: Vec<OsString> = vec![
            "run".into(),
            "--rm".into(),
            "-v".into(),
            volume,
            "-w".into(),
            self.mount_point.as_str().into(),
            self.image.as_str().into(),
            "--format".into(),
            request.format.as_str().into(),
            "--output".into(),
            output.into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(input.into());

        Ok((self.runtime.clone(), args))
    }
}

impl Renderer for ContainerRenderer {
    fn name(&self) -> &str {
        &self.image
    }

    fn check_available(&self) -> Result<()> {
        let path = resolve_program(&self.runtime)?;
        debug!(
            "Using container runtime {} with image {}",
            path.display(),
            self.image
        );
        Ok(())
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        let (program, args) = self.command_line(request)?;
        run_to_completion(&program, &args, request)
    }
}
