use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use loyalty_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::{validate_order_number, OrderNumberError};

//--------------------------------------     OrderNumber     ---------------------------------------------------------
/// A customer-supplied order number. Only digit strings with a valid Luhn checksum can be constructed via `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(String);

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate_order_number(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been uploaded, but the accrual system has not started working on it yet.
    New,
    /// The accrual system has accepted the order and is calculating the reward.
    Processing,
    /// The accrual system refused the order. No reward will be credited. Final.
    Invalid,
    /// The reward has been calculated and credited. Final.
    Processed,
}

impl OrderStatusType {
    /// Final orders never leave their state again and are never leased.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatusType {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    /// The user that uploaded the order. Never changes.
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatusType,
    /// Set if, and only if, the order is `Processed`
    pub accrual: Option<Points>,
    /// True while a worker holds the lease on this order
    pub leased: bool,
    pub uploaded_at: DateTime<Utc>,
    /// Last status or lease change. This is also the age stamp of a lease.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// `true` if the accrual is present exactly when the order is `Processed`.
    pub fn has_consistent_accrual(&self) -> bool {
        (self.status == OrderStatusType::Processed) == self.accrual.is_some()
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub user_id: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(number: OrderNumber, user_id: i64) -> Self {
        Self { number, user_id, uploaded_at: Utc::now() }
    }
}
