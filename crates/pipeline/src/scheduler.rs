use crate::error::{CityError, Result};
use crate::limits::clamp_workers;
use crate::scanner::SourceFile;
use codecity_analyzer::{AbsentReason, Analysis, Analyzer, FileMetric};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A file that produced no metric in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub relative: String,
    pub reason: String,
}

/// Fan-in result of one scheduling pass
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    /// Metrics in completion order
    pub metrics: Vec<FileMetric>,
    pub dropped: Vec<DroppedFile>,
}

enum TaskOutcome {
    Measured(FileMetric),
    Absent(AbsentReason),
    Failed(String),
}

/// Runs the analyzer over many files with at most `workers` in flight
pub struct Scheduler {
    analyzer: Arc<Analyzer>,
    workers: usize,
}

impl Scheduler {
    pub fn new(analyzer: Arc<Analyzer>, workers: usize) -> Self {
        Self {
            analyzer,
            workers: clamp_workers(workers),
        }
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyze every file; per-file problems drop that file only.
    ///
    /// All tasks are submitted up front and queue on a FIFO semaphore.
    /// Dropping the returned future abandons outstanding work.
    pub async fn run(&self, files: Vec<SourceFile>) -> Result<ScheduleReport> {
        let total = files.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let analyzer = Arc::clone(&self.analyzer);
            tasks.spawn(async move {
                let outcome = analyze_file(semaphore, analyzer, &file).await;
                (file.relative, outcome)
            });
        }

        let mut report = ScheduleReport::default();
        let mut done = 0usize;
        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok((relative, TaskOutcome::Measured(metric))) => {
                    log::debug!("Analyzed [{done}/{total}]: {relative}");
                    report.metrics.push(metric);
                }
                Ok((relative, TaskOutcome::Absent(reason))) => {
                    match reason {
                        AbsentReason::Unreadable(_) | AbsentReason::Backend(_) => {
                            log::warn!("Skipping [{done}/{total}] {relative}: {reason}");
                        }
                        _ => log::debug!("Skipping [{done}/{total}] {relative}: {reason}"),
                    }
                    report.dropped.push(DroppedFile {
                        relative,
                        reason: reason.to_string(),
                    });
                }
                Ok((relative, TaskOutcome::Failed(reason))) => {
                    log::warn!("Error analyzing [{done}/{total}] {relative}: {reason}");
                    report.dropped.push(DroppedFile { relative, reason });
                }
                Err(e) => {
                    log::warn!("Analysis task failed: {e}");
                    report.dropped.push(DroppedFile {
                        relative: String::new(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.metrics.is_empty() {
            return Err(CityError::NoAnalyzableFiles { attempted: total });
        }

        log::info!(
            "Analyzed {} of {total} files ({} dropped)",
            report.metrics.len(),
            report.dropped.len()
        );
        Ok(report)
    }
}

async fn analyze_file(
    semaphore: Arc<Semaphore>,
    analyzer: Arc<Analyzer>,
    file: &SourceFile,
) -> TaskOutcome {
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return TaskOutcome::Failed("worker pool closed".to_string());
    };

    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(e) => return TaskOutcome::Absent(AbsentReason::Unreadable(e.to_string())),
    };

    let name = file.name.clone();
    let relative = file.relative.clone();
    let analyzed =
        tokio::task::spawn_blocking(move || analyzer.analyze(&name, &relative, &bytes)).await;

    match analyzed {
        Ok(Analysis::Measured(metric)) => TaskOutcome::Measured(metric),
        Ok(Analysis::Absent(reason)) => TaskOutcome::Absent(reason),
        Err(e) => TaskOutcome::Failed(format!("analysis panicked: {e}")),
    }
}
