//! Loyalty Engine
//!
//! The loyalty engine keeps the orders uploaded by users in step with an external accrual system, which decides
//! whether an order earns loyalty points, and how many.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). Sqlite and Postgres are the two supported backends. The data types
//!    stored in the database are defined in [`db_types`] and are public.
//! 2. The [accrual pipeline](pipeline), which leases unfinished orders, asks the [accrual system](accrual_client) about
//!    each of them and writes the answers back. Leases that are abandoned along the way are reclaimed automatically.
//! 3. The public [order API](loyalty_api), used to accept order uploads and to list a user's orders.
mod db;

pub mod accrual_client;
pub mod db_types;
pub mod helpers;
mod loyalty_api;
pub mod pipeline;

#[cfg(feature = "postgres")]
pub use db::postgres::{db::PostgresDatabase, PostgresDatabaseError};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db::SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{InsertOrderResult, LeaseManagement, OrderManagement, UpdateOrderResult};
pub use loyalty_api::{
    errors::OrdersApiError,
    orders_api::{OrdersApi, SubmitOrderResult},
};
pub use pipeline::{AccrualPipeline, PipelineConfig, PipelineError};
