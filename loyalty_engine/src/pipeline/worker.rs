use std::{panic::AssertUnwindSafe, time::Duration};

use futures_util::FutureExt;
use log::*;
use tokio_util::sync::CancellationToken;

use super::{lease_guard::LeaseGuard, DispatchQueue, PipelineError};
use crate::{
    accrual_client::{AccrualApiError, AccrualLookup, AccrualStatus},
    db::traits::{LeaseManagement, UpdateOrderResult},
    db_types::{Order, OrderStatusType},
};

/// Longest pause a worker takes when the accrual system asks us to back off.
pub const MAX_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(60);

/// Applies the accrual system's answer to an order. Final orders, and answers that carry no news, leave the order as
/// it is.
pub fn apply_accrual_status(order: &Order, status: AccrualStatus) -> Order {
    let mut updated = order.clone();
    if order.status.is_final() {
        return updated;
    }
    match status {
        AccrualStatus::NotRegistered | AccrualStatus::Registered => {},
        AccrualStatus::Processing => updated.status = OrderStatusType::Processing,
        AccrualStatus::Invalid => {
            updated.status = OrderStatusType::Invalid;
            updated.accrual = None;
        },
        AccrualStatus::Processed(points) => {
            updated.status = OrderStatusType::Processed;
            updated.accrual = Some(points);
        },
    }
    updated
}

/// Takes leased orders off the dispatch queue, asks the accrual system about each one and writes the result back.
pub struct Worker<D, L> {
    id: usize,
    db: D,
    lookup: L,
    queue: DispatchQueue,
    lookup_timeout: Duration,
}

impl<D, L> Worker<D, L>
where
    D: LeaseManagement,
    L: AccrualLookup,
{
    pub fn new(id: usize, db: D, lookup: L, queue: DispatchQueue, lookup_timeout: Duration) -> Self {
        Self { id, db, lookup, queue, lookup_timeout }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        debug!("⚙️ Worker {} started", self.id);
        while let Some(order) = self.queue.pop(&cancel).await {
            if let Some(pause) = self.process(order).await {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(pause) => {},
                }
            }
        }
        debug!("⚙️ Worker {} stopped", self.id);
        Ok(())
    }

    /// Handles a single order. Returns how long to pause before the next one, if the accrual system asked for that.
    pub async fn process(&self, order: Order) -> Option<Duration> {
        let guard = LeaseGuard::new(self.db.clone(), order);
        let number = guard.order().number.clone();
        let outcome = AssertUnwindSafe(self.lookup.lookup(&number, self.lookup_timeout)).catch_unwind().await;
        let (updated, pause) = match outcome {
            Ok(Ok(status)) => (apply_accrual_status(guard.order(), status), None),
            Ok(Err(AccrualApiError::RateLimited { retry_after })) => {
                let pause = retry_after.min(MAX_RATE_LIMIT_PAUSE);
                warn!("⚙️ Worker {}: rate limited while looking up order {number}. Pausing for {pause:?}", self.id);
                (guard.order().clone(), Some(pause))
            },
            Ok(Err(e)) => {
                warn!("⚙️ Worker {}: lookup for order {number} failed. {e}", self.id);
                (guard.order().clone(), None)
            },
            Err(_) => {
                error!("⚙️ Worker {}: lookup for order {number} panicked. Releasing the order unchanged.", self.id);
                (guard.order().clone(), None)
            },
        };
        let changed = updated.status != guard.order().status;
        match guard.release(updated).await {
            Ok(UpdateOrderResult::Updated) if changed => info!("⚙️ Worker {}: order {number} updated", self.id),
            Ok(UpdateOrderResult::Updated) => trace!("⚙️ Worker {}: order {number} released unchanged", self.id),
            Ok(UpdateOrderResult::AlreadyFinal) => {
                debug!("⚙️ Worker {}: order {number} was already final. Nothing was written.", self.id)
            },
            Err(e) => error!("⚙️ Worker {}: could not write back order {number}. It stays leased. {e}", self.id),
        }
        pause
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use loyalty_common::Points;

    use super::*;

    fn order(status: OrderStatusType, accrual: Option<Points>) -> Order {
        Order {
            id: 1,
            number: "79927398713".parse().unwrap(),
            user_id: 1,
            status,
            accrual,
            leased: true,
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_order_transitions() {
        let new = order(OrderStatusType::New, None);
        assert_eq!(apply_accrual_status(&new, AccrualStatus::Registered), new);
        assert_eq!(apply_accrual_status(&new, AccrualStatus::NotRegistered), new);
        assert_eq!(apply_accrual_status(&new, AccrualStatus::Processing).status, OrderStatusType::Processing);
        let invalid = apply_accrual_status(&new, AccrualStatus::Invalid);
        assert_eq!(invalid.status, OrderStatusType::Invalid);
        assert!(invalid.has_consistent_accrual());
        let processed = apply_accrual_status(&new, AccrualStatus::Processed(Points::from_whole(500)));
        assert_eq!(processed.status, OrderStatusType::Processed);
        assert_eq!(processed.accrual, Some(Points::from(50_000)));
    }

    #[test]
    fn processing_order_transitions() {
        let processing = order(OrderStatusType::Processing, None);
        assert_eq!(apply_accrual_status(&processing, AccrualStatus::Registered), processing);
        assert_eq!(apply_accrual_status(&processing, AccrualStatus::Processing), processing);
        let processed = apply_accrual_status(&processing, AccrualStatus::Processed(Points::from(1)));
        assert_eq!(processed.accrual, Some(Points::from(1)));
    }

    #[test]
    fn final_orders_never_change() {
        let processed = order(OrderStatusType::Processed, Some(Points::from_whole(10)));
        assert_eq!(apply_accrual_status(&processed, AccrualStatus::Processing), processed);
        assert_eq!(apply_accrual_status(&processed, AccrualStatus::Processed(Points::from_whole(99))), processed);
        let invalid = order(OrderStatusType::Invalid, None);
        assert_eq!(apply_accrual_status(&invalid, AccrualStatus::Processed(Points::from_whole(1))), invalid);
    }
}
