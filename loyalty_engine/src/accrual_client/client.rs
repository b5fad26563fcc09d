use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};

use super::{AccrualApiError, AccrualLookup, AccrualResponse, AccrualStatus};
use crate::db_types::OrderNumber;

/// Used when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AccrualClient {
    base_url: String,
    client: Arc<Client>,
}

impl AccrualClient {
    /// Creates a client for the accrual system at `address`. A bare `host:port` is assumed to be plain HTTP.
    pub fn new(address: &str) -> Result<Self, AccrualApiError> {
        let address = address.trim().trim_end_matches('/');
        if address.is_empty() {
            return Err(AccrualApiError::Initialization("The accrual system address is empty".into()));
        }
        let base_url = if address.contains("://") { address.to_string() } else { format!("http://{address}") };
        let client = Client::builder().build().map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { base_url, client: Arc::new(client) })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, number: &OrderNumber) -> String {
        format!("{}/api/orders/{number}", self.base_url)
    }

    pub async fn fetch_status(
        &self,
        number: &OrderNumber,
        timeout: Duration,
    ) -> Result<AccrualStatus, AccrualApiError> {
        let url = self.url(number);
        trace!("🧮️ Querying {url}");
        let response =
            self.client.get(url).timeout(timeout).send().await.map_err(|e| map_transport_error(e, timeout))?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await.map_err(|e| map_transport_error(e, timeout))?;
                let status = parse_response(number, &body)?;
                trace!("🧮️ Order {number} is {status:?}");
                Ok(status)
            },
            StatusCode::NO_CONTENT => {
                trace!("🧮️ Order {number} is not registered with the accrual system");
                Ok(AccrualStatus::NotRegistered)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = retry_after(&response);
                debug!("🧮️ Rate limited by the accrual system. Retry after {retry_after:?}");
                Err(AccrualApiError::RateLimited { retry_after })
            },
            status => {
                let status = status.as_u16();
                let message = response.text().await.unwrap_or_default();
                Err(AccrualApiError::UnexpectedStatus { status, message })
            },
        }
    }
}

impl AccrualLookup for AccrualClient {
    async fn lookup(&self, number: &OrderNumber, timeout: Duration) -> Result<AccrualStatus, AccrualApiError> {
        self.fetch_status(number, timeout).await
    }
}

fn map_transport_error(err: reqwest::Error, timeout: Duration) -> AccrualApiError {
    if err.is_timeout() {
        AccrualApiError::Timeout(timeout)
    } else {
        AccrualApiError::Transport(err.to_string())
    }
}

fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Decodes a 200 response body. The response must be about the order that was asked for.
pub fn parse_response(number: &OrderNumber, body: &str) -> Result<AccrualStatus, AccrualApiError> {
    let response = serde_json::from_str::<AccrualResponse>(body)
        .map_err(|e| AccrualApiError::MalformedResponse(format!("{e}. Body: {body}")))?;
    if response.order.trim() != number.as_str() {
        return Err(AccrualApiError::MalformedResponse(format!(
            "Asked about order {number}, but the answer was about order {}",
            response.order
        )));
    }
    Ok(response.into())
}
