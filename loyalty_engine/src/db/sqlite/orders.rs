use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::InsertOrderResult},
    db_types::{NewOrder, Order, OrderNumber},
};

/// Inserts the order unless its number is already known, in which case the stored order is returned instead.
///
/// The uniqueness check is done by the `UNIQUE` constraint on `number`, so two concurrent submissions of the same
/// number cannot both succeed.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, SqliteDatabaseError> {
    let inserted = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (number, user_id, status, leased, uploaded_at, updated_at)
            VALUES ($1, $2, 'NEW', 0, $3, $4)
            ON CONFLICT (number) DO NOTHING
            RETURNING id, number, user_id, status, accrual, leased, uploaded_at, updated_at;
        "#,
    )
    .bind(order.number.as_str())
    .bind(order.user_id)
    .bind(order.uploaded_at)
    .bind(order.uploaded_at)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(order) => {
            trace!("🗃️ Order {} saved with id {}", order.number, order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        None => {
            let existing = fetch_order_by_number(&order.number, conn).await?.ok_or_else(|| {
                SqliteDatabaseError::QueryError(format!("Order {} was neither inserted nor found", order.number))
            })?;
            Ok(InsertOrderResult::AlreadyExists(existing))
        },
    }
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            SELECT id, number, user_id, status, accrual, leased, uploaded_at, updated_at
            FROM orders
            WHERE number = $1;
        "#,
    )
    .bind(number.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            SELECT id, number, user_id, status, accrual, leased, uploaded_at, updated_at
            FROM orders
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Newest uploads come first.
pub async fn fetch_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
            SELECT id, number, user_id, status, accrual, leased, uploaded_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at DESC, id DESC;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ User #{user_id} has {} orders", orders.len());
    Ok(orders)
}
