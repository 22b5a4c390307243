use crate::config::{CheckConfig, ErrorPolicy};
use crate::error::{Error, Result};
use crate::model::{DirectoryEntry, FileReport, Status};
use crate::progress::{ProgressReporter, SilentReporter};
use crate::scanner;
use crate::verify::Verifier;
use rayon::ThreadPoolBuilder;
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cooperative stop signal. Raising it stops dispatching new files; files
/// already handed to a worker still finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub dir: PathBuf,
    /// One report per dispatched entry, sorted by file name.
    pub results: Vec<FileReport>,
    /// Entries listed but never dispatched because the run was cancelled.
    pub not_dispatched: usize,
    pub duration: Duration,
}

impl RunReport {
    pub fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.results.iter().filter(|r| r.outcome.is_err())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Lists one directory and verifies every entry on a bounded worker pool.
pub struct Coordinator {
    config: CheckConfig,
    cancel: CancelToken,
}

impl Coordinator {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run the full check:
    /// 1. List the directory (any failure aborts before work is dispatched)
    /// 2. Dispatch one unit per entry onto the pool, blocking when the queue is full
    /// 3. Wait for every dispatched unit, funnelling results through one consumer
    pub fn run<R: ProgressReporter + ?Sized>(&self, reporter: &R) -> Result<RunReport> {
        let start = Instant::now();

        let dir = self.config.target_dir().map_err(|source| Error::DirectoryRead {
            path: PathBuf::from("."),
            source,
        })?;
        info!("Scanning {}", dir.display());
        let entries = scanner::list_entries(&dir)?;
        let total = entries.len();
        reporter.on_scan_complete(total);

        let workers = self.config.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("crccheck-worker-{}", idx))
            .build()?;
        debug!(
            "Dispatching {} entries to {} workers (queue capacity {})",
            total,
            workers,
            self.config.queue_capacity()
        );

        let verifier = Verifier::new(self.config.update);
        let fail_fast = self.config.error_policy == ErrorPolicy::FailFast;

        let (dispatched, mut results) = thread::scope(|ts| {
            let (job_tx, job_rx) =
                crossbeam_channel::bounded::<DirectoryEntry>(self.config.queue_capacity());
            let (result_tx, result_rx) = crossbeam_channel::unbounded::<FileReport>();

            // Single consumer: the only place results are reported from.
            let consumer = ts.spawn(move || {
                let mut results = Vec::with_capacity(total);
                for report in result_rx.iter() {
                    reporter.on_result(&report);
                    results.push(report);
                }
                results
            });

            let dispatched = pool.in_place_scope(|s| {
                for _ in 0..workers {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    let verifier = &verifier;
                    let cancel = &self.cancel;
                    s.spawn(move |_| {
                        for entry in job_rx.iter() {
                            let report = process_entry(verifier, &entry);
                            if fail_fast && report.outcome.is_err() {
                                cancel.cancel();
                            }
                            if result_tx.send(report).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(job_rx);

                let mut dispatched = 0usize;
                for entry in entries {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    if job_tx.send(entry).is_err() {
                        break;
                    }
                    dispatched += 1;
                }
                drop(job_tx);
                dispatched
            });

            drop(result_tx);
            let results = consumer
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            (dispatched, results)
        });

        let not_dispatched = total - dispatched;
        if not_dispatched > 0 {
            warn!("Run cancelled, {} of {} files not checked", not_dispatched, total);
        }

        // First failure in completion order, for the fail-fast error.
        let first_failure = results
            .iter()
            .position(|r| r.outcome.is_err())
            .map(|idx| results[idx].name.clone());

        results.sort_by(|a, b| a.name.cmp(&b.name));
        let duration = start.elapsed();
        debug!(
            "Checked {} files in {:.2}s",
            results.len(),
            duration.as_secs_f64()
        );

        let mut report = RunReport {
            dir,
            results,
            not_dispatched,
            duration,
        };
        reporter.on_run_complete(&report);

        if let (true, Some(name)) = (fail_fast, first_failure) {
            if let Some(idx) = report.results.iter().position(|r| r.name == name) {
                if let Err(source) = report.results.swap_remove(idx).outcome {
                    return Err(Error::Aborted {
                        name,
                        not_dispatched: report.not_dispatched,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(report)
    }
}

fn process_entry(verifier: &Verifier, entry: &DirectoryEntry) -> FileReport {
    let name = entry.display_name();
    let outcome = verifier.verify(entry);
    if let Err(e) = &outcome {
        debug!("Error processing '{}': {}", name, e);
    }
    FileReport { name, outcome }
}

/// Check one directory with no progress output.
pub fn check(config: CheckConfig) -> Result<RunReport> {
    Coordinator::new(config).run(&SilentReporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_empty_directory_yields_empty_report() {
        let tmp = tempdir().unwrap();
        let report = check(CheckConfig::new(tmp.path())).unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.not_dispatched, 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_single_worker_with_tiny_queue() {
        let tmp = tempdir().unwrap();
        for i in 0..10 {
            fs::write(tmp.path().join(format!("{} [00000000].bin", i)), "").unwrap();
        }
        let config = CheckConfig::new(tmp.path())
            .with_workers(1)
            .with_queue_capacity(1);
        let report = check(config).unwrap();
        assert_eq!(report.count(Status::Ok), 10);
    }
}
