pub mod db;
mod errors;

pub mod leases;
pub mod orders;

pub use errors::PostgresDatabaseError;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn new_pool(url: &str, max_connections: u32) -> Result<PgPool, PostgresDatabaseError> {
    let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
