//! # Loyalty engine public API
//!
//! * [`orders_api`] accepts order numbers uploaded by users and lists a user's orders with their accrual status.
//!
//! Like the rest of the engine, the API is generic over the database backend:
//!
//! ```rust,ignore
//! use loyalty_engine::{OrdersApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/loyalty.db", 5).await?;
//! let api = OrdersApi::new(db);
//! let result = api.submit_order(42, "79927398713").await?;
//! ```
pub mod errors;
pub mod orders_api;
