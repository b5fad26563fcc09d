use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccrualApiError {
    #[error("Could not initialize the accrual client: {0}")]
    Initialization(String),
    #[error("The accrual system did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Could not reach the accrual system: {0}")]
    Transport(String),
    #[error("Unexpected response from the accrual system. Status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Could not make sense of the accrual system response: {0}")]
    MalformedResponse(String),
    #[error("The accrual system is rate limiting us. Retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
}
