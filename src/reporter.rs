use colored::*;
use crccheck::{FileReport, Outcome, ProgressReporter, RunReport, Status};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Terminal reporter: a progress bar on stderr and one colored line per
/// checked file on stdout. Files without a checksum token print nothing.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_complete(&self, total_entries: usize) {
        let pb = ProgressBar::new(total_entries as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Checking [{bar:30.cyan/dim}] {pos}/{len} files",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_result(&self, report: &FileReport) {
        let line = format_line(report);
        let guard = self.bar.lock().unwrap();
        match (guard.as_ref(), line) {
            (Some(pb), Some(line)) => {
                pb.suspend(|| println!("{}", line));
                pb.inc(1);
            }
            (Some(pb), None) => pb.inc(1),
            (None, Some(line)) => println!("{}", line),
            (None, None) => {}
        }
    }

    fn on_run_complete(&self, report: &RunReport) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Check complete: {} ok, {} mismatched, {} updated, {} errors in {:.2}s",
            report.count(Status::Ok),
            report.count(Status::Mismatch),
            report.count(Status::Updated),
            report.count(Status::Error),
            report.duration.as_secs_f64()
        );
        if report.not_dispatched > 0 {
            eprintln!("  {} files not checked", report.not_dispatched);
        }
    }
}

/// `<name> - <STATUS>`, or `None` for files that carry no checksum.
pub fn format_line(report: &FileReport) -> Option<String> {
    let status = match &report.outcome {
        Ok(Outcome::Skipped) => return None,
        Ok(Outcome::Match(_)) => "OK".green().to_string(),
        Ok(Outcome::Mismatch { .. }) => "MISMATCH".red().to_string(),
        Ok(Outcome::Repaired { new_name, .. }) => {
            format!("{} ({})", "UPDATED".yellow(), new_name.to_string_lossy())
        }
        Err(err) => format!("{}: {}", "ERROR".red(), err),
    };
    Some(format!("{} - {}", report.name, status))
}
