use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfiguration(String),
    #[error("The order store is not available: {0}")]
    StoreUnavailable(String),
    #[error("The accrual pipeline is already running")]
    AlreadyRunning,
    #[error("The accrual pipeline is not running")]
    NotRunning,
    #[error("A pipeline task failed: {0}")]
    TaskFailed(String),
}
