//! Source tree discovery and export planning.

use crate::config::ExportFormat;
use crate::constants::DIAGRAM_EXTENSION;
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do when an export fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run on the first failed export.
    #[default]
    FailFast,
    /// Run every export and report failures at the end.
    KeepGoing,
}

/// Options for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Root of the diagram tree.
    pub source_dir: PathBuf,
    /// Root of the export tree.
    pub output_dir: PathBuf,
    /// Formats to export every diagram to.
    pub formats: Vec<ExportFormat>,
    /// Number of files exported concurrently.
    pub jobs: usize,
    /// Behaviour on failed exports.
    pub failure_policy: FailurePolicy,
}

/// Directories and diagram files found under a source root.
///
/// All paths are relative to the source root; the root itself is the empty
/// path. Both lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// Every directory, including the root.
    pub directories: Vec<PathBuf>,
    /// Every diagram file.
    pub files: Vec<PathBuf>,
}

/// All exports for one diagram file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    /// Path of the diagram on disk.
    pub input: PathBuf,
    /// Path of the diagram relative to the source root.
    pub relative: PathBuf,
    /// Destination per format, in configured format order.
    pub outputs: Vec<(ExportFormat, PathBuf)>,
}

/// Everything a run will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    /// Output directories to create, per format, in order.
    pub directories: Vec<PathBuf>,
    /// Files to export, in deterministic order.
    pub files: Vec<FileJob>,
}

impl ExportPlan {
    /// Number of individual (file, format) exports.
    pub fn job_count(&self) -> usize {
        self.files.iter().map(|f| f.outputs.len()).sum()
    }
}

/// Scan the source tree and compute every directory and destination.
///
/// When the output root lies inside the source tree, the output root and
/// the format roots are left out of the scan.
pub fn plan_export(options: &ExportOptions) -> Result<ExportPlan> {
    let mut excluded = vec![options.output_dir.clone()];
    excluded.extend(
        options
            .formats
            .iter()
            .map(|format| format_root(&options.output_dir, *format)),
    );
    let tree = scan_source_tree(&options.source_dir, &excluded)?;

    let directories = options
        .formats
        .iter()
        .flat_map(|format| {
            tree.directories
                .iter()
                .map(move |dir| join_relative(&format_root(&options.output_dir, *format), dir))
        })
        .collect();

    let files = tree
        .files
        .into_iter()
        .map(|relative| FileJob {
            input: options.source_dir.join(&relative),
            outputs: options
                .formats
                .iter()
                .map(|format| {
                    (
                        *format,
                        output_path_for(&relative, &options.output_dir, *format),
                    )
                })
                .collect(),
            relative,
        })
        .collect();

    Ok(ExportPlan { directories, files })
}

/// Root of one format's subtree.
pub fn format_root(output_dir: &Path, format: ExportFormat) -> PathBuf {
    output_dir.join(format.dir_name())
}

fn join_relative(base: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Destination of a diagram, given its path relative to the source root.
///
/// The relative directory is preserved and only the extension changes.
pub fn output_path_for(relative: &Path, output_dir: &Path, format: ExportFormat) -> PathBuf {
    format_root(output_dir, format)
        .join(relative)
        .with_extension(format.extension())
}

/// Create every planned output directory.
///
/// Existing directories are left alone, so this is safe to repeat.
pub fn prepare_output_dirs(directories: &[PathBuf]) -> Result<()> {
    for dir in directories {
        std::fs::create_dir_all(dir).map_err(|e| Error::OutputDirCreateFailed {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Collect directories and diagram files under `root`.
///
/// Directories whose absolute path equals one of `excluded` are skipped
/// along with everything below them.
pub fn scan_source_tree(root: &Path, excluded: &[PathBuf]) -> Result<SourceTree> {
    if !root.is_dir() {
        return Err(Error::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let excluded = excluded
        .iter()
        .map(std::path::absolute)
        .collect::<std::io::Result<Vec<_>>>()?;

    let mut tree = SourceTree {
        directories: vec![PathBuf::new()],
        files: Vec::new(),
    };
    scan_recursive(root, Path::new(""), &excluded, &mut tree)?;

    tree.directories.sort();
    tree.files.sort();
    Ok(tree)
}

/// Recursively collect entries of `root.join(relative)`.
fn scan_recursive(
    root: &Path,
    relative: &Path,
    excluded: &[PathBuf],
    tree: &mut SourceTree,
) -> Result<()> {
    let dir = root.join(relative);
    let read_error = |e: std::io::Error| Error::SourceRead {
        path: dir.clone(),
        source: e,
    };

    for entry in std::fs::read_dir(&dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let file_type = entry.file_type().map_err(read_error)?;
        let child = relative.join(entry.file_name());

        if file_type.is_dir() {
            let absolute = std::path::absolute(entry.path())?;
            if excluded.iter().any(|skip| *skip == absolute) {
                debug!("Skipping output directory: {}", entry.path().display());
                continue;
            }
            tree.directories.push(child.clone());
            scan_recursive(root, &child, excluded, tree)?;
        } else if file_type.is_symlink() && entry.path().is_dir() {
            debug!("Not following directory symlink: {}", entry.path().display());
        } else if entry.path().is_file() && is_diagram_file(&child) {
            tree.files.push(child);
        }
    }

    Ok(())
}

/// Check if a file has the diagram extension.
pub fn is_diagram_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OsStr::new(DIAGRAM_EXTENSION)))
}
