use crate::{
    db::traits::InsertOrderResult,
    db_types::{NewOrder, Order, OrderNumber},
};

/// The `OrderManagement` trait defines the behaviour for storing and querying orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    type Error: std::error::Error;

    /// Stores a new order with status `New`, unless an order with the same number already exists, in which case the
    /// existing order is returned in [`InsertOrderResult::AlreadyExists`]. Owner checks are left to the caller.
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, Self::Error>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, Self::Error>;

    /// All orders uploaded by the given user, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Self::Error>;
}
