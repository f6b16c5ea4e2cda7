//! MoySklad order client implementing `OrderSourcePort`.

use async_trait::async_trait;
use reqwest::header::ACCEPT_ENCODING;
use reqwest::{Client, StatusCode};

use crate::application::ports::{OrderSourceError, OrderSourcePort};
use crate::domain::Order;

use super::api_types::{OrderListResponse, map_rows};
use super::config::MoySkladConfig;
use super::error::MoySkladError;

/// HTTP client for the MoySklad customer order listing.
///
/// Stateless between calls: every fetch is one GET with HTTP Basic
/// credentials and `Accept-Encoding: gzip`.
#[derive(Debug, Clone)]
pub struct MoySkladOrderClient {
    client: Client,
    login: String,
    password: String,
    orders_url: String,
}

impl MoySkladOrderClient {
    /// Create a new client from config.
    pub fn new(config: &MoySkladConfig) -> Result<Self, MoySkladError> {
        if config.login.is_empty() || config.password.is_empty() {
            return Err(MoySkladError::MissingCredentials);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MoySkladError::Network(e.to_string()))?;

        Ok(Self {
            client,
            login: config.login.clone(),
            password: config.password.clone(),
            orders_url: config.orders_url(),
        })
    }

    /// Fetch and map the first page of customer orders.
    ///
    /// Any status other than 200 fails the whole fetch, and so does a single
    /// row that cannot be mapped.
    pub async fn get_orders(&self) -> Result<Vec<Order>, MoySkladError> {
        let response = self
            .client
            .get(&self.orders_url)
            .basic_auth(&self.login, Some(&self.password))
            .header(ACCEPT_ENCODING, "gzip")
            .send()
            .await
            .map_err(|e| MoySkladError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                url = %self.orders_url,
                "Order request failed"
            );
            return Err(MoySkladError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MoySkladError::Network(e.to_string()))?;
        let listing: OrderListResponse =
            serde_json::from_str(&text).map_err(|e| MoySkladError::JsonParse(e.to_string()))?;

        let orders = map_rows(listing.rows)?;
        tracing::info!(count = orders.len(), "Orders fetched");

        Ok(orders)
    }
}

#[async_trait]
impl OrderSourcePort for MoySkladOrderClient {
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderSourceError> {
        Ok(self.get_orders().await?)
    }
}
