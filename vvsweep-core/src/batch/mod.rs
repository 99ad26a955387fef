//! Batch launching of simulation jobs.
//!
//! A batch is a sweep over job indices `0..count`. Every index is handed
//! to an [`Executor`], which runs a single job with its combined output
//! redirected to a per-index file. Jobs are distributed over a fixed-size
//! worker pool, each worker blocking on its job until it's finished, so
//! that the number of jobs in flight never exceeds the pool size.
//!
//! Failing jobs don't stop the batch. Every job is run, failures are
//! collected into the final [`BatchReport`], and it's up to the caller to
//! turn the report into an error with [`BatchReport::into_result`].
//!
//! [`Executor`]: trait.Executor.html
//! [`BatchReport`]: struct.BatchReport.html
//! [`BatchReport::into_result`]: struct.BatchReport.html#method.into_result

mod exec;

pub use exec::SubprocessExecutor;

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::LauncherConfig;
use crate::error::Error;
use crate::Result;

/// Index of a single job within a batch.
pub type JobIndex = u32;

/// Exit information of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobExit {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl JobExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for JobExit {
    fn from(status: ExitStatus) -> Self {
        JobExit {
            code: status.code(),
        }
    }
}

/// Runs a single job.
///
/// Implementations get called concurrently from multiple workers.
pub trait Executor: Sync {
    /// Runs the job with the given index, writing all of its output to
    /// `output`. Blocks until the job is finished.
    fn execute(&self, index: JobIndex, output: File) -> io::Result<JobExit>;
}

/// Outcome of a single job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub index: JobIndex,
    /// Path to the file holding the job's output.
    pub output: PathBuf,
    /// Exit information, or the reason the job couldn't be run.
    pub result: std::result::Result<JobExit, String>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        match &self.result {
            Ok(exit) => exit.success(),
            Err(_) => false,
        }
    }

    /// Describes why the job failed, `None` if it didn't.
    pub fn failure(&self) -> Option<String> {
        match &self.result {
            Ok(exit) if exit.success() => None,
            Ok(JobExit { code: Some(code) }) => Some(format!("exited with code {}", code)),
            Ok(JobExit { code: None }) => Some("terminated by signal".to_string()),
            Err(e) => Some(e.clone()),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Reports for all the jobs, ordered by job index.
    pub jobs: Vec<JobReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| !j.is_success())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Turns the report into an error if any of the jobs failed.
    pub fn into_result(self) -> Result<BatchReport> {
        let failed = self.failed_count();
        if failed > 0 {
            Err(Error::BatchFailed {
                failed,
                total: self.total(),
            })
        } else {
            Ok(self)
        }
    }
}

/// Progress notification emitted while a batch is running.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    /// Single job finished, successfully or not. Emitted from the worker
    /// that ran the job.
    JobDone(&'a JobReport),
    /// All the jobs finished. Emitted exactly once per batch.
    AllDone(&'a BatchReport),
}

/// Runs batches of jobs on a fixed-size worker pool.
pub struct BatchLauncher {
    config: LauncherConfig,
    pool: rayon::ThreadPool,
}

impl BatchLauncher {
    /// Creates a new launcher, building a worker pool sized according to
    /// the config.
    pub fn new(config: LauncherConfig) -> Result<BatchLauncher> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|n| format!("vvsweep-worker-{}", n))
            .build()?;
        Ok(BatchLauncher { config, pool })
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Runs `count` jobs, each as a separate process of the configured
    /// program.
    pub fn run<F>(&self, count: JobIndex, on_event: F) -> Result<BatchReport>
    where
        F: Fn(BatchEvent) + Sync,
    {
        let executor = SubprocessExecutor::from_config(&self.config);
        self.run_with(&executor, count, on_event)
    }

    /// Runs `count` jobs using the provided executor.
    ///
    /// Blocks until all the jobs are finished.
    pub fn run_with<E, F>(&self, executor: &E, count: JobIndex, on_event: F) -> Result<BatchReport>
    where
        E: Executor,
        F: Fn(BatchEvent) + Sync,
    {
        if let Some(dir) = &self.config.dir {
            fs::create_dir_all(dir)?;
        }
        info!(
            "running {} jobs using {} workers",
            count, self.config.workers
        );

        let start = Instant::now();
        let config = &self.config;
        let jobs: Vec<JobReport> = self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .map(|index| {
                    let report = run_job(config, executor, index);
                    on_event(BatchEvent::JobDone(&report));
                    report
                })
                .collect()
        });

        let report = BatchReport {
            jobs,
            elapsed: start.elapsed(),
        };
        info!(
            "finished {} jobs in {:.2?}, {} failed",
            report.total(),
            report.elapsed,
            report.failed_count()
        );
        on_event(BatchEvent::AllDone(&report));
        Ok(report)
    }
}

fn run_job<E: Executor>(config: &LauncherConfig, executor: &E, index: JobIndex) -> JobReport {
    let output = config.output_path(index);
    debug!(
        "starting job {}, output: {}",
        index,
        output.to_string_lossy()
    );
    let result = File::create(&output)
        .and_then(|file| executor.execute(index, file))
        .map_err(|e| e.to_string());
    let report = JobReport {
        index,
        output,
        result,
    };
    if let Some(reason) = report.failure() {
        warn!("job {} failed: {}", index, reason);
    }
    report
}
