use std::time::Duration;

use log::*;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{lease_guard::release_unchanged, DispatchQueue, PipelineError};
use crate::db::traits::LeaseManagement;

/// Periodically leases a batch of pending orders and feeds them to the workers.
pub struct Fetcher<D> {
    db: D,
    queue: DispatchQueue,
    batch_size: usize,
    interval: Duration,
}

impl<D: LeaseManagement> Fetcher<D> {
    pub fn new(db: D, queue: DispatchQueue, batch_size: usize, interval: Duration) -> Self {
        Self { db, queue, batch_size, interval }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("📥️ Fetch loop started. Leasing up to {} orders every {:?}", self.batch_size, self.interval);
        'fetch: loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }
            let batch = match self.db.lease_batch(self.batch_size).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("📥️ Could not lease orders. {e}");
                    continue;
                },
            };
            if batch.is_empty() {
                continue;
            }
            trace!("📥️ Leased {} orders", batch.len());
            let mut pending = batch.into_iter();
            while let Some(order) = pending.next() {
                if let Err(order) = self.queue.push(order, &cancel).await {
                    let unpushed = std::iter::once(order).chain(pending).collect::<Vec<_>>();
                    let count = unpushed.len();
                    let released = release_unchanged(&self.db, unpushed).await;
                    debug!("📥️ Shutting down. Released {released} of {count} leased orders that were never queued");
                    break 'fetch;
                }
            }
        }
        debug!("📥️ Fetch loop stopped");
        Ok(())
    }
}
