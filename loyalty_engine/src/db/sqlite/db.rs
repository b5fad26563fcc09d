use std::fmt::Debug;

use chrono::Duration;
use log::{info, trace};
use sqlx::SqlitePool;

use super::{leases, new_pool, orders, SqliteDatabaseError};
use crate::{
    db::traits::{InsertOrderResult, LeaseManagement, OrderManagement, UpdateOrderResult},
    db_types::{NewOrder, Order, OrderNumber},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LeaseManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn lease_batch(&self, max_size: usize) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        leases::lease_batch(max_size, &mut conn).await
    }

    async fn reclaim_stale_leases(&self, older_than: Duration) -> Result<u64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        leases::reclaim_stale_leases(older_than, &mut conn).await
    }

    async fn write_result(&self, order: &Order) -> Result<UpdateOrderResult, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        leases::write_result(order, &mut conn).await
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_number(number, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(id, &mut conn).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
