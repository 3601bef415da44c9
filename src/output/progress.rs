//! Progress bar utilities for export runs.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for exporting multiple files.
pub fn create_file_progress(total_files: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_files == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_files as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} diagrams ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<&ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}

/// Run `f` with the progress bar hidden so log lines are not torn.
pub fn suspend<R>(pb: Option<&ProgressBar>, f: impl FnOnce() -> R) -> R {
    match pb {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_is_none() {
        assert!(create_file_progress(10, false).is_none());
        assert!(create_file_progress(0, true).is_none());
    }

    #[test]
    fn test_progress_counts_files() {
        let pb = create_file_progress(3, true);
        inc_progress(pb.as_ref());
        inc_progress(pb.as_ref());
        assert_eq!(pb.as_ref().map(ProgressBar::position), Some(2));
        finish_progress(pb.as_ref(), "Complete");
        assert!(pb.as_ref().is_some_and(ProgressBar::is_finished));
    }

    #[test]
    fn test_suspend_returns_value() {
        assert_eq!(suspend(None, || 42), 42);
    }
}
