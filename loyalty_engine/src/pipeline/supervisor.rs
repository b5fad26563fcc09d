use log::*;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{
    fetcher::Fetcher,
    lease_guard::release_unchanged,
    sweeper::Sweeper,
    worker::Worker,
    DispatchQueue,
    PipelineConfig,
    PipelineError,
};
use crate::{accrual_client::AccrualLookup, db::traits::LeaseManagement};

struct RunningPipeline {
    cancel: CancellationToken,
    tasks: JoinSet<Result<(), PipelineError>>,
    queue: DispatchQueue,
}

/// Owns the fetch loop, the sweep and the worker pool.
///
/// ```rust,ignore
/// let pipeline = AccrualPipeline::new(db, AccrualClient::new("http://localhost:8081")?, PipelineConfig::default());
/// pipeline.start(&shutdown).await?;
/// // ...
/// pipeline.stop().await?;
/// ```
pub struct AccrualPipeline<D, L> {
    db: D,
    lookup: L,
    config: PipelineConfig,
    running: Option<RunningPipeline>,
}

impl<D, L> AccrualPipeline<D, L>
where
    D: LeaseManagement,
    L: AccrualLookup,
{
    pub fn new(db: D, lookup: L, config: PipelineConfig) -> Self {
        Self { db, lookup, config, running: None }
    }

    /// `true` between a successful `start` and the moment the pipeline is stopped or its shutdown token fires.
    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.cancel.is_cancelled())
    }

    /// Spawns the pipeline tasks. They run until `shutdown` is cancelled or [`Self::stop`] is called.
    pub async fn start(&mut self, shutdown: &CancellationToken) -> Result<(), PipelineError> {
        if self.running.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }
        self.config.validate()?;
        let lease_age = self.config.lease_age()?;
        self.db.ping().await.map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        let cancel = shutdown.child_token();
        let queue = DispatchQueue::new(self.config.queue_capacity);
        let mut tasks = JoinSet::new();
        let fetcher =
            Fetcher::new(self.db.clone(), queue.clone(), self.config.batch_size, self.config.fetch_interval);
        tasks.spawn(fetcher.run(cancel.clone()));
        let sweeper = Sweeper::new(self.db.clone(), lease_age, self.config.sweep_interval);
        tasks.spawn(sweeper.run(cancel.clone()));
        for id in 0..self.config.worker_count {
            let worker =
                Worker::new(id, self.db.clone(), self.lookup.clone(), queue.clone(), self.config.lookup_timeout);
            tasks.spawn(worker.run(cancel.clone()));
        }
        info!("🚦️ Accrual pipeline started with {} workers", self.config.worker_count);
        self.running = Some(RunningPipeline { cancel, tasks, queue });
        Ok(())
    }

    /// Stops every task, waits for them to finish and releases any orders still waiting in the queue.
    ///
    /// Returns the first task failure, if there was one.
    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        let RunningPipeline { cancel, mut tasks, queue } = self.running.take().ok_or(PipelineError::NotRunning)?;
        info!("🚦️ Stopping the accrual pipeline");
        cancel.cancel();
        let mut first_failure = None;
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => format!("task panicked. {e}"),
            };
            error!("🚦️ A pipeline task failed: {failure}");
            if first_failure.is_none() {
                first_failure = Some(PipelineError::TaskFailed(failure));
            }
        }
        let queued = queue.drain().await;
        if !queued.is_empty() {
            let count = queued.len();
            let released = release_unchanged(&self.db, queued).await;
            info!("🚦️ Released {released} of {count} queued orders");
        }
        info!("🚦️ Accrual pipeline stopped");
        first_failure.map_or(Ok(()), Err)
    }
}
