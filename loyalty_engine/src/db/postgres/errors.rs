use thiserror::Error;

use crate::db_types::OrderStatusType;

#[derive(Debug, Error)]
pub enum PostgresDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Order not found: {0}")]
    OrderNotFound(i64),
    #[error("Order #{id} has status {status}, which does not agree with its accrual")]
    InvalidAccrual { id: i64, status: OrderStatusType },
}
