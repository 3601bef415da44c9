//! Export execution.

use crate::config::ExportFormat;
use crate::error::{Error, Result};
use crate::output::{ExportReporter, ExportSummary, FailedExport};
use crate::pipeline::{ExportOptions, ExportPlan, FailurePolicy, FileJob, prepare_output_dirs};
use crate::renderer::{RenderRequest, Renderer};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use tracing::debug;

/// Outcome of exporting one diagram to every format.
struct FileOutcome {
    index: usize,
    exported: usize,
    failures: Vec<(ExportFormat, Error)>,
}

/// Shared state of the workers of one run.
struct WorkQueue<'a> {
    files: &'a [FileJob],
    next: AtomicUsize,
    abort: AtomicBool,
    cancel: &'a AtomicBool,
    policy: FailurePolicy,
    renderer: &'a dyn Renderer,
    reporter: &'a dyn ExportReporter,
}

/// Execute an export plan.
///
/// Creates every planned directory, checks the renderer is available (only
/// when there is something to export), then exports each file with up to
/// `options.jobs` files in flight. Setting `cancel` stops new exports from
/// starting and ends the run with [`Error::Interrupted`].
///
/// Under [`FailurePolicy::FailFast`] with several jobs, files already in
/// flight when the first failure is seen still finish, and the error returned
/// is the earliest failure in file order among the files that ran. That can
/// be a different file than a sequential run would stop at.
pub fn export_plan(
    plan: &ExportPlan,
    options: &ExportOptions,
    renderer: &dyn Renderer,
    reporter: &dyn ExportReporter,
    cancel: &AtomicBool,
) -> Result<ExportSummary> {
    let start = Instant::now();

    prepare_output_dirs(&plan.directories)?;
    debug!("Prepared {} output directories", plan.directories.len());

    if !plan.files.is_empty() {
        renderer.check_available()?;
    }

    reporter.run_started(plan.files.len(), plan.job_count(), renderer.name());

    let queue = WorkQueue {
        files: &plan.files,
        next: AtomicUsize::new(0),
        abort: AtomicBool::new(false),
        cancel,
        policy: options.failure_policy,
        renderer,
        reporter,
    };

    let workers = options.jobs.clamp(1, plan.files.len().max(1));
    let mut outcomes = if workers == 1 {
        queue.drain()
    } else {
        debug!("Exporting with {} workers", workers);
        run_workers(&queue, workers)?
    };
    outcomes.sort_by_key(|outcome| outcome.index);

    if cancel.load(Ordering::SeqCst) {
        return Err(Error::Interrupted);
    }

    let mut summary = ExportSummary {
        files: plan.files.len(),
        ..ExportSummary::default()
    };

    for outcome in outcomes {
        summary.exported += outcome.exported;
        for (format, error) in outcome.failures {
            if options.failure_policy == FailurePolicy::FailFast {
                return Err(error);
            }
            summary.failed.push(FailedExport {
                file: plan.files[outcome.index].relative.clone(),
                format,
                message: error.to_string(),
            });
        }
    }

    summary.duration = start.elapsed();
    reporter.run_completed(&summary, &options.output_dir);

    if summary.is_success() {
        Ok(summary)
    } else {
        Err(Error::ExportsFailed {
            failed: summary.failed.len(),
        })
    }
}

fn run_workers(queue: &WorkQueue<'_>, workers: usize) -> Result<Vec<FileOutcome>> {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| queue.drain()))
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            let worker_outcomes = handle.join().map_err(|_| Error::Internal {
                message: "export worker panicked".to_string(),
            })?;
            outcomes.extend(worker_outcomes);
        }
        Ok(outcomes)
    })
}

impl WorkQueue<'_> {
    /// Export files until the queue is empty or the run is stopped.
    fn drain(&self) -> Vec<FileOutcome> {
        let mut outcomes = Vec::new();

        while !self.abort.load(Ordering::SeqCst) && !self.cancel.load(Ordering::SeqCst) {
            let index = self.next.fetch_add(1, Ordering::SeqCst);
            let Some(job) = self.files.get(index) else {
                break;
            };

            let outcome = self.export_file(index, job);
            if self.policy == FailurePolicy::FailFast && !outcome.failures.is_empty() {
                self.abort.store(true, Ordering::SeqCst);
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    fn export_file(&self, index: usize, job: &FileJob) -> FileOutcome {
        self.reporter.file_started(&job.relative);

        let mut produced: Vec<PathBuf> = Vec::with_capacity(job.outputs.len());
        let mut failures = Vec::new();

        for (format, destination) in &job.outputs {
            let request = RenderRequest {
                input: job.input.as_path(),
                format: *format,
                destination: destination.as_path(),
            };

            match self.renderer.render(&request) {
                Ok(()) => produced.push(destination.clone()),
                Err(e) => {
                    self.reporter.export_failed(&job.relative, *format, &e);
                    failures.push((*format, e));
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        self.reporter.file_finished(&job.relative, &produced);

        FileOutcome {
            index,
            exported: produced.len(),
            failures,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::NullReporter;
    use crate::pipeline::plan_export;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Renderer writing a placeholder file, failing for inputs named `broken`.
    struct FakeRenderer {
        available: bool,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl FakeRenderer {
        fn new() -> Self {
            Self {
                available: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Renderer for FakeRenderer {
        fn name(&self) -> &str {
            "fake"
        }

        fn check_available(&self) -> Result<()> {
            if self.available {
                Ok(())
            } else {
                Err(Error::RendererNotFound {
                    program: "fake".to_string(),
                })
            }
        }

        fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(request.destination.to_path_buf());
            if request.input.file_stem().is_some_and(|s| s == "broken") {
                return Err(Error::RenderFailed {
                    input: request.input.to_path_buf(),
                    format: request.format,
                    status: "exit code 1".to_string(),
                    stderr: "malformed diagram".to_string(),
                });
            }
            fs::write(request.destination, request.format.as_str())?;
            Ok(())
        }
    }

    struct Fixture {
        tmp: TempDir,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let tmp = TempDir::new().unwrap();
            for file in files {
                let path = tmp.path().join("diagrams").join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, "<mxfile/>").unwrap();
            }
            fs::create_dir_all(tmp.path().join("diagrams")).unwrap();
            Self { tmp }
        }

        fn options(&self, jobs: usize, failure_policy: FailurePolicy) -> ExportOptions {
            ExportOptions {
                source_dir: self.tmp.path().join("diagrams"),
                output_dir: self.tmp.path().join("build"),
                formats: vec![ExportFormat::Png, ExportFormat::Pdf],
                jobs,
                failure_policy,
            }
        }

        fn output(&self, relative: &str) -> PathBuf {
            self.tmp.path().join("build").join(relative)
        }

        fn run(&self, renderer: &FakeRenderer, options: &ExportOptions) -> Result<ExportSummary> {
            let plan = plan_export(options)?;
            export_plan(
                &plan,
                options,
                renderer,
                &NullReporter,
                &AtomicBool::new(false),
            )
        }
    }

    #[test]
    fn test_every_file_exported_to_every_format() {
        let fixture = Fixture::new(&["network/topology.drawio", "floor.drawio"]);
        let renderer = FakeRenderer::new();

        let summary = fixture
            .run(&renderer, &fixture.options(1, FailurePolicy::FailFast))
            .unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.exported, 4);
        assert!(fixture.output("png/network/topology.png").is_file());
        assert!(fixture.output("pdf/network/topology.pdf").is_file());
        assert!(fixture.output("png/floor.png").is_file());
        assert!(fixture.output("pdf/floor.pdf").is_file());
    }

    #[test]
    fn test_empty_tree_only_mirrors_directories() {
        let fixture = Fixture::new(&[]);
        fs::create_dir_all(fixture.tmp.path().join("diagrams/cooling/chillers")).unwrap();
        let renderer = FakeRenderer {
            available: false,
            ..FakeRenderer::new()
        };

        let summary = fixture
            .run(&renderer, &fixture.options(1, FailurePolicy::FailFast))
            .unwrap();

        assert_eq!(summary.exported, 0);
        assert_eq!(renderer.call_count(), 0);
        assert!(fixture.output("png/cooling/chillers").is_dir());
        assert!(fixture.output("pdf/cooling/chillers").is_dir());
        assert_eq!(
            fs::read_dir(fixture.output("png/cooling/chillers"))
                .unwrap()
                .count(),
            0
        );
    }

    #[test]
    fn test_unavailable_renderer_fails_before_exporting() {
        let fixture = Fixture::new(&["a.drawio"]);
        let renderer = FakeRenderer {
            available: false,
            ..FakeRenderer::new()
        };

        let result = fixture.run(&renderer, &fixture.options(1, FailurePolicy::FailFast));

        assert!(matches!(result, Err(Error::RendererNotFound { .. })));
        assert_eq!(renderer.call_count(), 0);
        assert!(!fixture.output("png/a.png").exists());
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let fixture = Fixture::new(&["a.drawio", "broken.drawio", "c.drawio"]);
        let renderer = FakeRenderer::new();

        let result = fixture.run(&renderer, &fixture.options(1, FailurePolicy::FailFast));

        assert!(matches!(result, Err(Error::RenderFailed { .. })));
        // a: png + pdf, broken: png fails and aborts; c never starts
        assert_eq!(renderer.call_count(), 3);
        assert!(fixture.output("pdf/a.pdf").is_file());
        assert!(!fixture.output("png/c.png").exists());
    }

    #[test]
    fn test_parallel_fail_fast_returns_render_failure() {
        let fixture = Fixture::new(&["a.drawio", "broken.drawio", "c.drawio", "d.drawio"]);
        let renderer = FakeRenderer::new();

        let result = fixture.run(&renderer, &fixture.options(4, FailurePolicy::FailFast));

        match result {
            Err(Error::RenderFailed { input, .. }) => {
                assert_eq!(input.file_name().unwrap(), "broken.drawio");
            }
            other => panic!("expected render failure, got {other:?}"),
        }
        // The failing file stops after its first format
        assert!(!fixture.output("pdf/broken.pdf").exists());
    }

    #[test]
    fn test_keep_going_reports_every_failure() {
        let fixture = Fixture::new(&["a.drawio", "broken.drawio", "c.drawio"]);
        let renderer = FakeRenderer::new();

        let result = fixture.run(&renderer, &fixture.options(1, FailurePolicy::KeepGoing));

        assert!(matches!(result, Err(Error::ExportsFailed { failed: 2 })));
        assert_eq!(renderer.call_count(), 6);
        assert!(fixture.output("png/c.png").is_file());
        assert!(fixture.output("pdf/c.pdf").is_file());
    }

    #[test]
    fn test_parallel_export_matches_sequential_outputs() {
        let files = [
            "a.drawio",
            "b/c.drawio",
            "b/d.drawio",
            "e/f/g.drawio",
            "h.drawio",
        ];
        let sequential = Fixture::new(&files);
        let parallel = Fixture::new(&files);

        sequential
            .run(&FakeRenderer::new(), &sequential.options(1, FailurePolicy::FailFast))
            .unwrap();
        let summary = parallel
            .run(&FakeRenderer::new(), &parallel.options(4, FailurePolicy::FailFast))
            .unwrap();

        assert_eq!(summary.exported, 10);
        for file in files {
            let stem = Path::new(file).with_extension("");
            let stem = stem.to_string_lossy();
            for (dir, ext) in [("png", "png"), ("pdf", "pdf")] {
                let relative = format!("{dir}/{stem}.{ext}");
                assert!(sequential.output(&relative).is_file());
                assert!(parallel.output(&relative).is_file());
            }
        }
    }

    #[test]
    fn test_cancelled_run_is_interrupted() {
        let fixture = Fixture::new(&["a.drawio"]);
        let options = fixture.options(1, FailurePolicy::FailFast);
        let plan = plan_export(&options).unwrap();
        let renderer = FakeRenderer::new();

        let result = export_plan(
            &plan,
            &options,
            &renderer,
            &NullReporter,
            &AtomicBool::new(true),
        );

        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(renderer.call_count(), 0);
    }

    #[test]
    fn test_rerun_overwrites_outputs() {
        let fixture = Fixture::new(&["a.drawio"]);
        let options = fixture.options(1, FailurePolicy::FailFast);
        fixture.run(&FakeRenderer::new(), &options).unwrap();
        fs::write(fixture.output("png/a.png"), "stale").unwrap();

        fixture.run(&FakeRenderer::new(), &options).unwrap();

        assert_eq!(fs::read_to_string(fixture.output("png/a.png")).unwrap(), "png");
    }
}
