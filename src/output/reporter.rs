//! Progress reporting for export runs.
//!
//! The exporter reports through the [`ExportReporter`] trait so the CLI can
//! log human-readable lines while tests record events.

use crate::config::ExportFormat;
use crate::error::Error;
use crate::output::progress;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Trait for reporting progress during an export run.
///
/// Methods may be called from several worker threads.
pub trait ExportReporter: Send + Sync {
    /// Report run start.
    fn run_started(&self, total_files: usize, total_exports: usize, renderer: &str);

    /// Report that a diagram is about to be exported.
    fn file_started(&self, file: &Path);

    /// Report that a single export of a diagram failed.
    fn export_failed(&self, file: &Path, format: ExportFormat, error: &Error);

    /// Report that a diagram is done, with every destination written.
    fn file_finished(&self, file: &Path, produced: &[PathBuf]);

    /// Report run completion.
    fn run_completed(&self, summary: &ExportSummary, output_dir: &Path);
}

/// One export that did not produce its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedExport {
    /// Diagram path relative to the source root.
    pub file: PathBuf,
    /// Format that failed.
    pub format: ExportFormat,
    /// Rendered error message.
    pub message: String,
}

/// Summary of an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Diagrams found.
    pub files: usize,
    /// Individual exports that succeeded.
    pub exported: usize,
    /// Individual exports that failed.
    pub failed: Vec<FailedExport>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ExportSummary {
    /// Whether every export succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reporter writing to the tracing log, with an optional progress bar.
pub struct LogReporter {
    progress: Option<ProgressBar>,
}

impl LogReporter {
    /// Create a reporter, with a progress bar when `progress_enabled`.
    pub fn new(total_files: usize, progress_enabled: bool) -> Self {
        Self {
            progress: progress::create_file_progress(total_files, progress_enabled),
        }
    }
}

impl ExportReporter for LogReporter {
    fn run_started(&self, total_files: usize, total_exports: usize, renderer: &str) {
        progress::suspend(self.progress.as_ref(), || {
            info!(
                "Found {} diagram(s), {} export(s) to run with {}",
                total_files, total_exports, renderer
            );
        });
    }

    fn file_started(&self, file: &Path) {
        progress::suspend(self.progress.as_ref(), || {
            info!("Exporting {}", file.display());
        });
    }

    fn export_failed(&self, file: &Path, format: ExportFormat, error: &Error) {
        progress::suspend(self.progress.as_ref(), || {
            warn!("Failed to export {} to {}: {}", file.display(), format, error);
            if let Error::RenderFailed { stderr, .. } = error
                && !stderr.is_empty()
            {
                warn!("Renderer output:\n{stderr}");
            }
        });
    }

    fn file_finished(&self, file: &Path, produced: &[PathBuf]) {
        progress::suspend(self.progress.as_ref(), || {
            for destination in produced {
                info!("Exported {} -> {}", file.display(), destination.display());
            }
        });
        progress::inc_progress(self.progress.as_ref());
    }

    fn run_completed(&self, summary: &ExportSummary, output_dir: &Path) {
        let status = if summary.is_success() { "Complete" } else { "Failed" };
        progress::finish_progress(self.progress.as_ref(), status);

        info!(
            "{} diagram(s): {} exported, {} failed in {:.2}s",
            summary.files,
            summary.exported,
            summary.failed.len(),
            summary.duration.as_secs_f64()
        );

        if summary.is_success() {
            info!("Export complete: outputs written to {}", output_dir.display());
        } else {
            for failure in &summary.failed {
                warn!(
                    "  {} ({}): {}",
                    failure.file.display(),
                    failure.format,
                    failure.message
                );
            }
            warn!("{} export(s) failed", summary.failed.len());
        }
    }
}

/// Reporter that discards every event.
pub struct NullReporter;

impl ExportReporter for NullReporter {
    fn run_started(&self, _total_files: usize, _total_exports: usize, _renderer: &str) {}

    fn file_started(&self, _file: &Path) {}

    fn export_failed(&self, _file: &Path, _format: ExportFormat, _error: &Error) {}

    fn file_finished(&self, _file: &Path, _produced: &[PathBuf]) {}

    fn run_completed(&self, _summary: &ExportSummary, _output_dir: &Path) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_success() {
        let mut summary = ExportSummary {
            files: 1,
            exported: 2,
            ..ExportSummary::default()
        };
        assert!(summary.is_success());

        summary.failed.push(FailedExport {
            file: PathBuf::from("a.drawio"),
            format: ExportFormat::Pdf,
            message: "exit code 1".to_string(),
        });
        assert!(!summary.is_success());
    }

    #[test]
    fn test_log_reporter_without_progress() {
        let reporter = LogReporter::new(2, false);
        reporter.file_started(Path::new("a.drawio"));
        reporter.file_finished(Path::new("a.drawio"), &[PathBuf::from("build/png/a.png")]);
        reporter.run_completed(&ExportSummary::default(), Path::new("build"));
        assert!(reporter.progress.is_none());
    }
}
