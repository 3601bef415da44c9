//! Run reporting: progress bar, progress lines and summary.

pub mod progress;
mod reporter;

pub use reporter::{ExportReporter, ExportSummary, FailedExport, LogReporter, NullReporter};
