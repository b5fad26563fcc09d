use crate::db_types::Order;

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// An order with the same number already exists. The stored order is returned unchanged.
    AlreadyExists(Order),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrderResult {
    /// The status and accrual were written and the lease was released.
    Updated,
    /// The stored order had already reached a final status. Nothing was written.
    AlreadyFinal,
}
