//! Client for the external accrual system, which calculates the reward earned by each order.
//!
//! The pipeline only depends on the [`AccrualLookup`] trait. [`AccrualClient`] is the HTTP implementation.
mod client;
mod errors;
mod objects;

use std::{future::Future, time::Duration};

pub use client::AccrualClient;
pub use errors::AccrualApiError;
pub use objects::{AccrualResponse, AccrualStatus, AccrualStatusType};

use crate::db_types::OrderNumber;

pub trait AccrualLookup: Clone + Send + Sync + 'static {
    /// Asks the accrual system for the current state of the order. The whole exchange is bounded by `timeout`.
    fn lookup(
        &self,
        number: &OrderNumber,
        timeout: Duration,
    ) -> impl Future<Output = Result<AccrualStatus, AccrualApiError>> + Send;
}
