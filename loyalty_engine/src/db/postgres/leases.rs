//! Lease bookkeeping for Postgres.
//!
//! `lease_batch` selects candidate rows with `FOR UPDATE SKIP LOCKED`, so concurrent fetchers skip rows that another
//! transaction is busy leasing instead of waiting for them. All timestamps come from the database clock.
use chrono::Duration;
use log::{debug, trace};
use sqlx::PgConnection;

use crate::{
    db::{
        postgres::{orders, PostgresDatabaseError},
        traits::UpdateOrderResult,
    },
    db_types::Order,
};

pub async fn lease_batch(max_size: usize, conn: &mut PgConnection) -> Result<Vec<Order>, PostgresDatabaseError> {
    if max_size == 0 {
        return Ok(Vec::new());
    }
    let limit = i64::try_from(max_size).unwrap_or(i64::MAX);
    let mut orders = sqlx::query_as::<_, Order>(
        r#"
            WITH selected_orders AS (
                SELECT id
                FROM orders
                WHERE status IN ('NEW', 'PROCESSING') AND leased = FALSE
                ORDER BY updated_at ASC, id ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE orders o
            SET leased = TRUE, updated_at = NOW()
            FROM selected_orders so
            WHERE o.id = so.id
            RETURNING o.id, o.number, o.user_id, o.status, o.accrual, o.leased, o.uploaded_at, o.updated_at;
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await?;
    orders.sort_by_key(|o| o.id);
    trace!("🗃️ Leased {} orders", orders.len());
    Ok(orders)
}

pub async fn reclaim_stale_leases(older_than: Duration, conn: &mut PgConnection) -> Result<u64, PostgresDatabaseError> {
    #[allow(clippy::cast_precision_loss)]
    let seconds = older_than.num_milliseconds() as f64 / 1000.0;
    let result = sqlx::query(
        "UPDATE orders SET leased = FALSE WHERE leased = TRUE AND updated_at <= NOW() - make_interval(secs => $1)",
    )
    .bind(seconds)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn write_result(order: &Order, conn: &mut PgConnection) -> Result<UpdateOrderResult, PostgresDatabaseError> {
    if !order.has_consistent_accrual() {
        return Err(PostgresDatabaseError::InvalidAccrual { id: order.id, status: order.status });
    }
    let result = sqlx::query(
        r#"
            UPDATE orders
            SET status = $1, accrual = $2, leased = FALSE, updated_at = NOW()
            WHERE id = $3 AND status IN ('NEW', 'PROCESSING');
        "#,
    )
    .bind(order.status.to_string())
    .bind(order.accrual)
    .bind(order.id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        trace!("🗃️ Order {} is now {} and no longer leased", order.number, order.status);
        return Ok(UpdateOrderResult::Updated);
    }
    match orders::fetch_order_by_id(order.id, conn).await? {
        None => Err(PostgresDatabaseError::OrderNotFound(order.id)),
        Some(stored) if stored.status.is_final() => {
            debug!("🗃️ Order {} is already {}. The write-back was skipped.", stored.number, stored.status);
            Ok(UpdateOrderResult::AlreadyFinal)
        },
        Some(stored) => Err(PostgresDatabaseError::QueryError(format!(
            "Order {} ({}) could not be updated",
            stored.number, stored.status
        ))),
    }
}
