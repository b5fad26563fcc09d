//! #  Order storage contracts.
//!
//! This module defines the interface contracts that order storage *backends* must fulfil. The accrual pipeline and the
//! order submission API are written against these traits only, so any store that can honour them can be used.
//!
//! * [`LeaseManagement`] is the contract the reconciliation pipeline depends on: leasing batches of pending orders
//!   exclusively, writing results back and reclaiming leases that were abandoned by crashed or stuck workers.
//! * [`OrderManagement`] covers order submission and the read paths used by query handlers.
//!
//! ## Leases
//! A lease is nothing more than the `leased` flag on an order row, combined with the `updated_at` timestamp, which
//! doubles as the lease age. There is no lease owner. Whoever holds a leased order may write it back, and anyone may
//! reclaim leases older than the lease timeout.
mod data_objects;
mod lease_management;
mod order_management;

pub use data_objects::{InsertOrderResult, UpdateOrderResult};
pub use lease_management::LeaseManagement;
pub use order_management::OrderManagement;
