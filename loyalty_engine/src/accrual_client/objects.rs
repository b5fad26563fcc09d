use loyalty_common::Points;
use serde::{Deserialize, Serialize};

/// The order states, as the accrual system names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatusType {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// The JSON body of a successful `GET /api/orders/{number}` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualResponse {
    pub order: String,
    pub status: AccrualStatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

/// What the accrual system knows about an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualStatus {
    /// The accrual system has never heard of the order (HTTP 204).
    NotRegistered,
    Registered,
    Processing,
    Invalid,
    Processed(Points),
}

impl From<AccrualResponse> for AccrualStatus {
    fn from(response: AccrualResponse) -> Self {
        match response.status {
            AccrualStatusType::Registered => Self::Registered,
            AccrualStatusType::Processing => Self::Processing,
            AccrualStatusType::Invalid => Self::Invalid,
            AccrualStatusType::Processed => Self::Processed(response.accrual.unwrap_or_default()),
        }
    }
}
