//! Lease bookkeeping for SQLite.
//!
//! SQLite has no `SKIP LOCKED`, but it only ever admits one writer. Each lease operation is therefore written as a
//! single `UPDATE` statement, which SQLite executes atomically. Two concurrent `lease_batch` calls are serialized,
//! and the second one no longer sees the rows the first one leased.
use chrono::{Duration, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::{
        sqlite::{orders, SqliteDatabaseError},
        traits::UpdateOrderResult,
    },
    db_types::Order,
};

pub async fn lease_batch(max_size: usize, conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    if max_size == 0 {
        return Ok(Vec::new());
    }
    let limit = i64::try_from(max_size).unwrap_or(i64::MAX);
    let mut orders = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders
            SET leased = 1, updated_at = $1
            WHERE id IN (
                SELECT id
                FROM orders
                WHERE status IN ('NEW', 'PROCESSING') AND leased = 0
                ORDER BY updated_at ASC, id ASC
                LIMIT $2
            )
            RETURNING id, number, user_id, status, accrual, leased, uploaded_at, updated_at;
        "#,
    )
    .bind(Utc::now())
    .bind(limit)
    .fetch_all(conn)
    .await?;
    orders.sort_by_key(|o| o.id);
    trace!("🗃️ Leased {} orders", orders.len());
    Ok(orders)
}

pub async fn reclaim_stale_leases(
    older_than: Duration,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let threshold = Utc::now() - older_than;
    let result = sqlx::query("UPDATE orders SET leased = 0 WHERE leased = 1 AND updated_at <= $1")
        .bind(threshold)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn write_result(
    order: &Order,
    conn: &mut SqliteConnection,
) -> Result<UpdateOrderResult, SqliteDatabaseError> {
    if !order.has_consistent_accrual() {
        return Err(SqliteDatabaseError::InvalidAccrual { id: order.id, status: order.status });
    }
    let result = sqlx::query(
        r#"
            UPDATE orders
            SET status = $1, accrual = $2, leased = 0, updated_at = $3
            WHERE id = $4 AND status IN ('NEW', 'PROCESSING');
        "#,
    )
    .bind(order.status.to_string())
    .bind(order.accrual)
    .bind(Utc::now())
    .bind(order.id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        trace!("🗃️ Order {} is now {} and no longer leased", order.number, order.status);
        return Ok(UpdateOrderResult::Updated);
    }
    match orders::fetch_order_by_id(order.id, conn).await? {
        None => Err(SqliteDatabaseError::OrderNotFound(order.id)),
        Some(stored) if stored.status.is_final() => {
            debug!("🗃️ Order {} is already {}. The write-back was skipped.", stored.number, stored.status);
            Ok(UpdateOrderResult::AlreadyFinal)
        },
        Some(stored) => Err(SqliteDatabaseError::QueryError(format!(
            "Order {} ({}) could not be updated",
            stored.number, stored.status
        ))),
    }
}
