use loyalty_engine::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Accrual pipeline error. {0}")]
    PipelineError(#[from] PipelineError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
}
