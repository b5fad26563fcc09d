#![allow(dead_code)]

pub mod accrual_server;
pub mod faulty_store;
pub mod lookups;

use std::{env, time::Duration};

use chrono::Utc;
use log::*;
use loyalty_engine::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType},
    helpers::luhn_check_digit,
    InsertOrderResult,
    OrderManagement,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = env::temp_dir();
    format!("sqlite://{}/loyalty_test_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates an empty, fully migrated database with a random name.
pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    if let Err(e) = Sqlite::drop_database(&url).await {
        trace!("🚀️ Nothing to drop at {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Created test database {url}");
    db
}

/// A Luhn-valid order number derived from `seed`.
pub fn order_number(seed: u64) -> OrderNumber {
    let payload = format!("{}", 1_000_000 + seed);
    let check = luhn_check_digit(&payload).expect("payload is all digits");
    format!("{payload}{check}").parse().expect("number is Luhn-valid")
}

/// Inserts `count` new orders for `user_id`, using seeds starting at `first_seed`.
pub async fn seed_orders(db: &SqliteDatabase, user_id: i64, first_seed: u64, count: u64) -> Vec<Order> {
    let mut orders = Vec::with_capacity(count as usize);
    for seed in first_seed..first_seed + count {
        match db.insert_order(NewOrder::new(order_number(seed), user_id)).await.expect("Error inserting order") {
            InsertOrderResult::Inserted(order) => orders.push(order),
            InsertOrderResult::AlreadyExists(order) => panic!("Order {} was already seeded", order.number),
        }
    }
    orders
}

/// Pretends the lease (or last update) on every order happened `by` ago.
pub async fn backdate_orders(db: &SqliteDatabase, by: chrono::Duration) {
    sqlx::query("UPDATE orders SET updated_at = $1")
        .bind(Utc::now() - by)
        .execute(db.pool())
        .await
        .expect("Error backdating orders");
}

pub async fn all_orders(db: &SqliteDatabase) -> Vec<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY id")
        .fetch_all(db.pool())
        .await
        .expect("Error fetching orders")
}

pub async fn fetch(db: &SqliteDatabase, id: i64) -> Order {
    db.fetch_order_by_id(id).await.expect("Error fetching order").expect("Order does not exist")
}

/// Polls the order until `check` passes, or panics after `timeout`.
pub async fn wait_for_order<F>(db: &SqliteDatabase, id: i64, timeout: Duration, check: F) -> Order
where F: Fn(&Order) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let order = fetch(db, id).await;
        if check(&order) {
            return order;
        }
        assert!(tokio::time::Instant::now() < deadline, "Timed out waiting on order {id}. Last seen: {order:?}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub async fn wait_for_status(db: &SqliteDatabase, id: i64, status: OrderStatusType) -> Order {
    wait_for_order(db, id, Duration::from_secs(5), |o| o.status == status && !o.leased).await
}
