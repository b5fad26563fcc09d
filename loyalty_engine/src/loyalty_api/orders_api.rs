use std::fmt::Debug;

use log::*;

use super::errors::OrdersApiError;
use crate::{
    db::traits::{InsertOrderResult, OrderManagement},
    db_types::{NewOrder, Order, OrderNumber},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOrderResult {
    /// The order is new, and will be picked up by the accrual pipeline.
    Accepted(Order),
    /// The same user uploaded this order before. Nothing changed.
    AlreadyAccepted(Order),
}

impl SubmitOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            Self::Accepted(o) | Self::AlreadyAccepted(o) => o,
        }
    }
}

pub struct OrdersApi<B> {
    db: B,
}

impl<B> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi")
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    /// Validates `raw_number` and stores it as a `NEW` order for `user_id`.
    ///
    /// Uploading the same number twice is harmless for the user that owns it. If another user owns the number, the
    /// stored order is left alone and [`OrdersApiError::Conflict`] is returned.
    pub async fn submit_order(&self, user_id: i64, raw_number: &str) -> Result<SubmitOrderResult, OrdersApiError<B>> {
        let number = raw_number.parse::<OrderNumber>()?;
        let order = NewOrder::new(number, user_id);
        match self.db.insert_order(order).await.map_err(OrdersApiError::DatabaseError)? {
            InsertOrderResult::Inserted(order) => {
                info!("📦️ Order {} accepted for user #{user_id}", order.number);
                Ok(SubmitOrderResult::Accepted(order))
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("📦️ User #{user_id} uploaded order {} again", order.number);
                Ok(SubmitOrderResult::AlreadyAccepted(order))
            },
            InsertOrderResult::AlreadyExists(order) => {
                warn!("📦️ User #{user_id} tried to upload order {}, which belongs to someone else", order.number);
                Err(OrdersApiError::Conflict { number: order.number.to_string() })
            },
        }
    }

    /// All orders uploaded by the user, newest first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrdersApiError<B>> {
        self.db.fetch_orders_for_user(user_id).await.map_err(OrdersApiError::DatabaseError)
    }

    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrdersApiError<B>> {
        self.db.fetch_order_by_number(number).await.map_err(OrdersApiError::DatabaseError)
    }
}
