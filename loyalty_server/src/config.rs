use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use loyalty_common::{helpers::parse_boolean_flag, Secret};
use loyalty_engine::pipeline::{
    PipelineConfig,
    DEFAULT_BATCH_SIZE,
    DEFAULT_FETCH_INTERVAL,
    DEFAULT_LEASE_TIMEOUT,
    DEFAULT_LOOKUP_TIMEOUT,
    DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SWEEP_INTERVAL,
    DEFAULT_WORKER_COUNT,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_ACCRUAL_SYSTEM_ADDRESS: &str = "http://localhost:8081";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The order database. The URL scheme selects the backend.
    pub database_url: Secret<String>,
    pub accrual_system_address: String,
    pub db_max_connections: u32,
    /// If true, migrations are run against the database before the pipeline starts.
    pub run_migrations: bool,
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: Secret::new(DEFAULT_DATABASE_URL.to_string()),
            accrual_system_address: DEFAULT_ACCRUAL_SYSTEM_ADDRESS.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            run_migrations: true,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from any key-value source. Missing or invalid values fall back to the defaults.
    pub fn from_source<F>(var: F) -> Self
    where F: Fn(&str) -> Option<String>
    {
        let database_url = var("LOYALTY_DATABASE_URL").unwrap_or_else(|| {
            warn!("🪛️ LOYALTY_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let accrual_system_address = var("LOYALTY_ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|| {
            info!(
                "🪛️ LOYALTY_ACCRUAL_SYSTEM_ADDRESS is not set. Using the default, {DEFAULT_ACCRUAL_SYSTEM_ADDRESS}."
            );
            DEFAULT_ACCRUAL_SYSTEM_ADDRESS.to_string()
        });
        let db_max_connections = parse_or_default(&var, "LOYALTY_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let run_migrations = parse_boolean_flag(var("LOYALTY_RUN_MIGRATIONS"), true);
        let pipeline = PipelineConfig {
            batch_size: parse_or_default(&var, "LOYALTY_BATCH_SIZE", DEFAULT_BATCH_SIZE),
            queue_capacity: parse_or_default(&var, "LOYALTY_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            worker_count: parse_or_default(&var, "LOYALTY_WORKER_COUNT", DEFAULT_WORKER_COUNT),
            lookup_timeout: Duration::from_secs(parse_or_default(
                &var,
                "LOYALTY_LOOKUP_TIMEOUT",
                DEFAULT_LOOKUP_TIMEOUT.as_secs(),
            )),
            lease_timeout: Duration::from_secs(parse_or_default(
                &var,
                "LOYALTY_LEASE_TIMEOUT",
                DEFAULT_LEASE_TIMEOUT.as_secs(),
            )),
            sweep_interval: Duration::from_millis(parse_or_default(
                &var,
                "LOYALTY_SWEEP_INTERVAL",
                millis(DEFAULT_SWEEP_INTERVAL),
            )),
            fetch_interval: Duration::from_millis(parse_or_default(
                &var,
                "LOYALTY_FETCH_INTERVAL",
                millis(DEFAULT_FETCH_INTERVAL),
            )),
        };
        Self {
            database_url: Secret::new(database_url),
            accrual_system_address,
            db_max_connections,
            run_migrations,
            pipeline,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn parse_or_default<F, T>(var: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(name) {
        None => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e} Using the default, {default}, instead.");
            default
        }),
    }
}
