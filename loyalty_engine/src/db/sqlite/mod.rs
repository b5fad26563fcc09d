pub mod db;
mod errors;

pub mod leases;
pub mod orders;

use std::{str::FromStr, time::Duration};

pub use errors::SqliteDatabaseError;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection pool, creating the database file if it does not exist yet.
///
/// SQLite allows a single writer at a time. Writers that find the database locked wait for up to `BUSY_TIMEOUT`
/// before giving up.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
