use log::*;
use loyalty_engine::{
    accrual_client::AccrualClient,
    AccrualPipeline,
    LeaseManagement,
    PostgresDatabase,
    SqliteDatabase,
};
use tokio_util::sync::CancellationToken;

use crate::{config::ServerConfig, errors::ServerError};

/// The order database backends the server can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, ServerError> {
        let url = url.trim();
        if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else {
            Err(ServerError::ConfigurationError(
                "LOYALTY_DATABASE_URL must start with sqlite:, postgres:// or postgresql://".to_string(),
            ))
        }
    }
}

/// Connects to the database, starts the accrual pipeline and runs it until Ctrl-C is pressed.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let url = config.database_url.reveal().as_str();
    let max_connections = config.db_max_connections;
    match Backend::from_url(url)? {
        Backend::Sqlite => {
            let db = SqliteDatabase::new_with_url(url, max_connections)
                .await
                .map_err(|e| ServerError::InitializeError(e.to_string()))?;
            if config.run_migrations {
                db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
            }
            info!("🚀️ Using the SQLite order database");
            run_pipeline(db.clone(), &config).await?;
            db.close().await;
        },
        Backend::Postgres => {
            let db = PostgresDatabase::new_with_url(url, max_connections)
                .await
                .map_err(|e| ServerError::InitializeError(e.to_string()))?;
            if config.run_migrations {
                db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
            }
            info!("🚀️ Using the Postgres order database");
            run_pipeline(db.clone(), &config).await?;
            db.close().await;
        },
    }
    Ok(())
}

async fn run_pipeline<D: LeaseManagement>(db: D, config: &ServerConfig) -> Result<(), ServerError> {
    let client = AccrualClient::new(&config.accrual_system_address)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Accrual system at {}", client.base_url());
    let shutdown = CancellationToken::new();
    let mut pipeline = AccrualPipeline::new(db, client, config.pipeline.clone());
    pipeline.start(&shutdown).await?;
    let signal = tokio::signal::ctrl_c().await;
    match &signal {
        Ok(()) => info!("🚀️ Ctrl-C received. Shutting down."),
        Err(e) => error!("🚀️ Could not listen for Ctrl-C. Shutting down. {e}"),
    }
    shutdown.cancel();
    pipeline.stop().await?;
    signal?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn backend_from_url() {
        assert_eq!(Backend::from_url("sqlite://data/loyalty.db").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("postgres://user:pw@localhost/loyalty").unwrap(), Backend::Postgres);
        assert_eq!(Backend::from_url("postgresql://localhost/loyalty").unwrap(), Backend::Postgres);
        assert!(matches!(Backend::from_url("mysql://localhost/loyalty"), Err(ServerError::ConfigurationError(_))));
    }
}
