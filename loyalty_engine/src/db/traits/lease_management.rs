use std::future::Future;

use chrono::Duration;

use crate::{db::traits::UpdateOrderResult, db_types::Order};

/// The storage contract behind the accrual pipeline.
///
/// The returned futures must be `Send`, since the pipeline drives these calls from spawned tasks.
pub trait LeaseManagement: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Atomically leases up to `max_size` orders that are `New` or `Processing` and not currently leased, oldest
    /// `updated_at` first.
    ///
    /// The leased orders are marked as such, their `updated_at` is set to the lease time, and they are returned
    /// sorted by `id`. Concurrent callers never receive the same order. A `max_size` of zero returns an empty batch.
    fn lease_batch(&self, max_size: usize) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send;

    /// Releases every lease that is at least `older_than` old, regardless of who took it.
    ///
    /// Returns the number of orders that were released.
    fn reclaim_stale_leases(&self, older_than: Duration) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Writes the order's status and accrual and releases its lease in a single update.
    ///
    /// If the stored order is already final, nothing is written and [`UpdateOrderResult::AlreadyFinal`] is returned.
    /// An order whose accrual is inconsistent with its status is rejected without touching the store.
    fn write_result(&self, order: &Order) -> impl Future<Output = Result<UpdateOrderResult, Self::Error>> + Send;

    /// Checks that the store can be reached.
    fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
