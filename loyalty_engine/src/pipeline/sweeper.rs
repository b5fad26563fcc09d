use std::time::Duration;

use log::*;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::PipelineError;
use crate::db::traits::LeaseManagement;

/// Periodically returns abandoned leases to the pool of pending orders.
pub struct Sweeper<D> {
    db: D,
    lease_age: chrono::Duration,
    interval: Duration,
}

impl<D: LeaseManagement> Sweeper<D> {
    pub fn new(db: D, lease_age: chrono::Duration, interval: Duration) -> Self {
        Self { db, lease_age, interval }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let age = self.lease_age.num_seconds();
        debug!("🧹️ Sweep started. Reclaiming leases older than {age}s every {:?}", self.interval);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }
            match self.db.reclaim_stale_leases(self.lease_age).await {
                Ok(0) => {},
                Ok(count) => info!("🧹️ Reclaimed {count} stale leases"),
                Err(e) => warn!("🧹️ Could not reclaim stale leases. {e}"),
            }
        }
        debug!("🧹️ Sweep stopped");
        Ok(())
    }
}
