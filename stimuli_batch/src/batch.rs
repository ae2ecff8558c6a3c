// THEORY:
// The batch layer turns a `SweepConfig` into files on disk. It plans one job per
// (repetition, grid size) pair, hands the jobs to a small worker pool and waits for
// every job to report back.
//
// Key principles:
// 1.  **Independent randomness**: each job seeds its own `StdRng` from the sweep's base
//     seed and the job's ordinal. Workers share nothing, and a sweep is reproducible
//     no matter how many workers run it or in which order jobs finish.
// 2.  **Blocking work off the runtime**: composing and PNG encoding are CPU and disk
//     bound, so workers run them on `spawn_blocking`.
// 3.  **All or nothing**: a partial stimulus set is useless for an experiment. The
//     first failed job flips a shared cancel flag; queued jobs are skipped instead of
//     rendered, and the sweep reports the failure that caused the cancel.

use crate::config::SweepConfig;
use crate::folders::OutputFolders;
use anyhow::{Context, Result, anyhow};
use dot_stimuli::compose;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

/// Odd 64-bit constant used to spread job ordinals across the seed space.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// One stimulus triplet to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    /// Position in the sweep, used to derive the job's seed.
    pub ordinal: u64,
    pub array_size: u32,
    /// 1-based repetition index within the grid size.
    pub repetition: u32,
}

/// What a finished job wrote.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Job,
    pub target_index: usize,
    pub stimulus_path: PathBuf,
    pub tmap_path: PathBuf,
    pub dmap_path: PathBuf,
}

#[derive(Debug)]
pub struct SweepSummary {
    pub seed: u64,
    pub reports: Vec<JobReport>,
}

/// Reply for a job that never ran because an earlier job failed.
#[derive(thiserror::Error, Debug)]
#[error("job {0} skipped after an earlier failure")]
pub struct JobSkipped(pub u64);

struct JobTask {
    job: Job,
    result_sender: oneshot::Sender<Result<JobReport>>,
}

/// Repetition-major job order: every grid size for repetition 1, then repetition 2, ...
pub fn plan(config: &SweepConfig) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(config.batch_size as usize * config.grid_sizes.len());
    for repetition in 1..=config.batch_size {
        for &array_size in &config.grid_sizes {
            jobs.push(Job {
                ordinal: jobs.len() as u64,
                array_size,
                repetition,
            });
        }
    }
    jobs
}

/// The random source for one job.
pub fn job_rng(seed: u64, ordinal: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ ordinal.wrapping_add(1).wrapping_mul(SEED_STRIDE))
}

/// Composes one triplet and writes its three images.
pub fn render_job(config: &SweepConfig, folders: &OutputFolders, seed: u64, job: Job) -> Result<JobReport> {
    let mut rng = job_rng(seed, job.ordinal);
    let spec = config.spec(job.array_size);
    let triplet = compose(&spec, &mut rng)
        .with_context(|| format!("composing {}x{} stimulus #{}", job.array_size, job.array_size, job.repetition))?;

    let report = JobReport {
        job,
        target_index: triplet.target_index,
        stimulus_path: folders.stimulus_path(job.array_size, job.repetition),
        tmap_path: folders.tmap_path(job.array_size, job.repetition),
        dmap_path: folders.dmap_path(job.array_size, job.repetition),
    };

    for (canvas, path) in [
        (&triplet.stimulus, &report.stimulus_path),
        (&triplet.target_map, &report.tmap_path),
        (&triplet.distractor_map, &report.dmap_path),
    ] {
        canvas
            .save(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }

    debug!(
        "wrote {} (target {} of {})",
        report.stimulus_path.display(),
        report.target_index,
        triplet.coordinates.len()
    );
    Ok(report)
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<JobTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(config: Arc<SweepConfig>, folders: Arc<OutputFolders>, seed: u64, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<JobTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<JobTask>())
            .unzip();

        // Round-robin dispatcher
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        for mut worker_receiver in worker_receivers {
            let config = Arc::clone(&config);
            let folders = Arc::clone(&folders);
            let cancelled = Arc::clone(&cancelled);

            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let job = task.job;
                    if cancelled.load(Ordering::SeqCst) {
                        let _ = task.result_sender.send(Err(JobSkipped(job.ordinal).into()));
                        continue;
                    }

                    let config = Arc::clone(&config);
                    let folders = Arc::clone(&folders);
                    let result = tokio::task::spawn_blocking(move || render_job(&config, &folders, seed, job))
                        .await
                        .map_err(|err| anyhow!("worker for job {} panicked: {err}", job.ordinal))
                        .and_then(|result| result);

                    if result.is_err() {
                        cancelled.store(true, Ordering::SeqCst);
                    }
                    let _ = task.result_sender.send(result);
                }
            }));
        }

        Self {
            task_sender,
            workers,
            cancelled,
        }
    }

    /// Makes every worker skip the jobs still queued.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub async fn submit(&self, job: Job) -> Result<JobReport> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(JobTask { job, result_sender })
            .map_err(|_| anyhow!("failed to send job {} to worker pool", job.ordinal))?;

        result_receiver
            .await
            .map_err(|_| anyhow!("worker dropped job {}", job.ordinal))?
    }

    /// Closes the queue and waits for every worker to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Runs the whole sweep described by `config`.
pub async fn run_sweep(config: SweepConfig) -> Result<SweepSummary> {
    config.validate()?;
    let started = Instant::now();

    let seed = config.seed.unwrap_or_else(rand::random);
    let worker_count = config.workers.unwrap_or_else(num_cpus::get);
    let folders = Arc::new(OutputFolders::prepare(&config.output_root)?);
    let jobs = plan(&config);

    info!(
        "generating {} stimulus triplets into {} (seed {seed}, {worker_count} workers)",
        jobs.len(),
        folders.root.display()
    );

    let pool = WorkerPool::new(Arc::new(config), Arc::clone(&folders), seed, worker_count);
    let mut pending: FuturesUnordered<_> = jobs.into_iter().map(|job| pool.submit(job)).collect();
    let mut outcomes = Vec::new();
    while let Some(outcome) = pending.next().await {
        if outcome.is_err() {
            pool.cancel();
        }
        outcomes.push(outcome);
    }
    drop(pending);
    pool.shutdown().await;
    let reports = collect_reports(outcomes)?;

    for report in &reports {
        debug!(
            "job {}: {}x{} #{} target {}",
            report.job.ordinal,
            report.job.array_size,
            report.job.array_size,
            report.job.repetition,
            report.target_index
        );
    }

    info!(
        "wrote {} triplets in {:.2?}",
        reports.len(),
        started.elapsed()
    );
    Ok(SweepSummary { seed, reports })
}

/// Keeps the reports of a clean sweep, or returns the failure that cancelled it.
fn collect_reports(outcomes: Vec<Result<JobReport>>) -> Result<Vec<JobReport>> {
    let mut reports = Vec::with_capacity(outcomes.len());
    let mut skipped = 0usize;
    let mut failure = None;

    for outcome in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(err) if err.is::<JobSkipped>() => skipped += 1,
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }

    reports.sort_by_key(|report: &JobReport| report.job.ordinal);

    match failure {
        Some(err) => {
            warn!(
                "sweep aborted: {} jobs finished, {skipped} skipped",
                reports.len()
            );
            Err(err)
        }
        None if skipped > 0 => Err(anyhow!("{skipped} jobs were skipped without a recorded failure")),
        None => Ok(reports),
    }
}
