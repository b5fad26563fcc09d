use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Duration;
use loyalty_engine::{db_types::Order, LeaseManagement, SqliteDatabase, SqliteDatabaseError, UpdateOrderResult};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaultyStoreError {
    #[error("{0} failed on purpose")]
    Injected(&'static str),
    #[error(transparent)]
    Database(#[from] SqliteDatabaseError),
}

#[derive(Clone, Default)]
struct Fault {
    remaining: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Fault {
    /// Counts the call and reports whether it should fail.
    fn strikes(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
    }
}

/// Wraps a [`SqliteDatabase`] and breaks a given number of lease calls before letting them through.
#[derive(Clone)]
pub struct FaultyStore {
    db: SqliteDatabase,
    lease: Fault,
    reclaim: Fault,
    write: Fault,
}

impl FaultyStore {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db, lease: Fault::default(), reclaim: Fault::default(), write: Fault::default() }
    }

    /// The next `count` calls to `lease_batch` return an error.
    pub fn fail_leases(self, count: usize) -> Self {
        self.lease.remaining.store(count, Ordering::SeqCst);
        self
    }

    /// The next `count` calls to `reclaim_stale_leases` return an error.
    pub fn fail_reclaims(self, count: usize) -> Self {
        self.reclaim.remaining.store(count, Ordering::SeqCst);
        self
    }

    /// The next `count` calls to `write_result` panic.
    pub fn panic_on_writes(self, count: usize) -> Self {
        self.write.remaining.store(count, Ordering::SeqCst);
        self
    }

    pub fn lease_calls(&self) -> usize {
        self.lease.calls.load(Ordering::SeqCst)
    }

    pub fn reclaim_calls(&self) -> usize {
        self.reclaim.calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write.calls.load(Ordering::SeqCst)
    }
}

impl LeaseManagement for FaultyStore {
    type Error = FaultyStoreError;

    async fn lease_batch(&self, max_size: usize) -> Result<Vec<Order>, Self::Error> {
        if self.lease.strikes() {
            return Err(FaultyStoreError::Injected("lease_batch"));
        }
        Ok(self.db.lease_batch(max_size).await?)
    }

    async fn reclaim_stale_leases(&self, older_than: Duration) -> Result<u64, Self::Error> {
        if self.reclaim.strikes() {
            return Err(FaultyStoreError::Injected("reclaim_stale_leases"));
        }
        Ok(self.db.reclaim_stale_leases(older_than).await?)
    }

    async fn write_result(&self, order: &Order) -> Result<UpdateOrderResult, Self::Error> {
        if self.write.strikes() {
            panic!("Writing back order {} blew up", order.number);
        }
        Ok(self.db.write_result(order).await?)
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        Ok(self.db.ping().await?)
    }
}
