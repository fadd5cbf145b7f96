use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{error, info};

use crate::case::{Case, CaseError, CaseReport};
use crate::config::RunConfig;

/// Outcome of one case, keyed by case name
pub type CaseOutcome = (String, Result<CaseReport, CaseError>);

/// Open and run a single case
pub fn run_case(name: &str, config: &RunConfig) -> Result<CaseReport, CaseError> {
    let case = Case::open_by_name(name, &config.roots, config.plot_references)?;
    case.run()
}

/// Run the selected cases, in parallel when more than one thread is configured
///
/// A failing case is logged and reported in its outcome; the others still run.
/// Outcomes keep the order of `config.selected_cases()`.
pub fn run_cases(config: &RunConfig) -> Result<Vec<CaseOutcome>, String> {
    let names = config.selected_cases();
    if config.num_threads <= 1 || names.len() <= 1 {
        let monitor = ProgressMonitor::new(names.len());
        return Ok(names
            .into_iter()
            .map(|name| {
                let result = run_case(&name, config);
                monitor.finish(&name, &result);
                (name, result)
            })
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
        .map_err(|e| format!("Failed to create thread pool: {}", e))?;

    Ok(pool.install(|| run_cases_parallel(&names, config)))
}

/// Run cases on the current rayon pool
pub fn run_cases_parallel(names: &[String], config: &RunConfig) -> Vec<CaseOutcome> {
    info!(
        cases = names.len(),
        threads = rayon::current_num_threads(),
        "running cases in parallel"
    );
    let monitor = ProgressMonitor::new(names.len());

    names
        .par_iter()
        .map(|name| {
            let result = run_case(name, config);
            monitor.finish(name, &result);
            (name.clone(), result)
        })
        .collect()
}

/// Tracks completed cases across worker threads
pub struct ProgressMonitor {
    total: usize,
    completed: AtomicUsize,
    start_time: Instant,
}

impl ProgressMonitor {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one finished case and log its outcome
    pub fn finish(&self, name: &str, result: &Result<CaseReport, CaseError>) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let elapsed = self.start_time.elapsed().as_secs_f64();
        match result {
            Ok(report) => info!(
                case = name,
                panels = report.panel_count(),
                empty = report.empty_panel_count(),
                "case finished ({}/{}, {:.1}s)",
                completed,
                self.total,
                elapsed
            ),
            Err(e) => error!(case = name, "case failed ({}/{}): {}", completed, self.total, e),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }
}
