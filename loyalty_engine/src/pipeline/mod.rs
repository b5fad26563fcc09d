//! # The accrual pipeline
//!
//! Keeps every unfinished order in step with the external accrual system:
//!
//! * The [fetch loop](fetcher) leases batches of `NEW` and `PROCESSING` orders and pushes them onto a bounded
//!   [`DispatchQueue`].
//! * A pool of [workers](worker) pops orders, looks each one up, and writes the result back. Every write-back, whether
//!   the order changed or not, clears the lease.
//! * The [sweep](sweeper) reclaims leases that were never released, e.g. after a crash.
//!
//! [`AccrualPipeline`] starts and stops the lot. Delivery is at-least-once: an order can be looked up more than once,
//! but once it is final it never changes again.
mod config;
mod dispatch;
mod errors;
pub mod fetcher;
pub mod lease_guard;
pub mod supervisor;
pub mod sweeper;
pub mod worker;

pub use config::{
    PipelineConfig,
    DEFAULT_BATCH_SIZE,
    DEFAULT_FETCH_INTERVAL,
    DEFAULT_LEASE_TIMEOUT,
    DEFAULT_LOOKUP_TIMEOUT,
    DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SWEEP_INTERVAL,
    DEFAULT_WORKER_COUNT,
};
pub use dispatch::DispatchQueue;
pub use errors::PipelineError;
pub use supervisor::AccrualPipeline;
