use log::*;

use crate::{
    db::traits::{LeaseManagement, UpdateOrderResult},
    db_types::Order,
};

/// Holds the lease on a single order until it is written back.
///
/// Call [`LeaseGuard::release`] with the (possibly updated) order. If the guard is dropped without being released,
/// e.g. because the task holding it was aborted, the order is written back unchanged from a freshly spawned task.
pub struct LeaseGuard<D: LeaseManagement> {
    db: D,
    order: Order,
    released: bool,
}

impl<D: LeaseManagement> LeaseGuard<D> {
    pub fn new(db: D, order: Order) -> Self {
        Self { db, order, released: false }
    }

    /// The order as it was leased.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Writes `order` back to the store, which also clears its lease.
    pub async fn release(mut self, order: Order) -> Result<UpdateOrderResult, D::Error> {
        let result = self.db.write_result(&order).await;
        // Nothing is left for Drop to do, even if the write-back failed.
        self.released = true;
        result
    }
}

impl<D: LeaseManagement> Drop for LeaseGuard<D> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let order = self.order.clone();
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("⚙️ Order {} was dropped while leased. The sweep will reclaim it.", order.number);
            return;
        };
        debug!("⚙️ Order {} was dropped while leased. Releasing it unchanged.", order.number);
        let db = self.db.clone();
        handle.spawn(async move {
            if let Err(e) = db.write_result(&order).await {
                warn!("⚙️ Could not release order {}: {e}. The sweep will reclaim it.", order.number);
            }
        });
    }
}

/// Writes every order back unchanged. Failures are logged and left for the sweep.
pub async fn release_unchanged<D: LeaseManagement>(db: &D, orders: Vec<Order>) -> usize {
    let mut released = 0;
    for order in orders {
        match db.write_result(&order).await {
            Ok(_) => released += 1,
            Err(e) => warn!("⚙️ Could not release order {}: {e}. The sweep will reclaim it.", order.number),
        }
    }
    released
}
