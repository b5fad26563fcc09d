use thiserror::Error;

use crate::{db::traits::OrderManagement, helpers::OrderNumberError};

#[derive(Debug, Error)]
pub enum OrdersApiError<B: OrderManagement> {
    #[error("Database error: {0}")]
    DatabaseError(B::Error),
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Order {number} was already uploaded by another user")]
    Conflict { number: String },
}
