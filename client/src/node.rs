use std::time::Duration;

use log::{debug, warn};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use votecap_api::types::*;
use votecap_api::{ApiError, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_VOTERS_TIMEOUT_SECONDS};

use crate::pagination::{parse_items, Pager};

/// Client for the node's public HTTP API.
///
/// Every request carries an explicit timeout; the voter listing has its own,
/// usually longer, bound.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: HttpClient,
    base_url: String,
    request_timeout: Duration,
    voters_timeout: Duration,
}

impl NodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            voters_timeout: Duration::from_secs(DEFAULT_VOTERS_TIMEOUT_SECONDS),
        }
    }

    pub fn with_timeouts(mut self, request_timeout: Duration, voters_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.voters_timeout = voters_timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Turns a `meta.next` cursor into an absolute URI.
    pub fn resolve(&self, cursor: &str) -> String {
        if cursor.starts_with("http://") || cursor.starts_with("https://") {
            cursor.to_string()
        } else {
            format!("{}{}", self.base_url, cursor)
        }
    }

    pub async fn get_node_status(&self) -> Result<NodeStatus, ApiError> {
        let uri = format!("{}/node/status", self.base_url);
        let envelope: Envelope<NodeStatus> = self.get_json(&uri, self.request_timeout).await?;
        Ok(envelope.data)
    }

    pub async fn get_peers(&self) -> Result<Vec<Peer>, ApiError> {
        let uri = format!("{}/peers", self.base_url);
        self.paginate(uri, self.request_timeout, parse_items::<Peer>).await
    }

    pub async fn get_voters(&self, username: &str) -> Result<Vec<Wallet>, ApiError> {
        let uri = format!("{}/delegates/{}/voters", self.base_url, username);
        self.paginate(uri, self.voters_timeout, parse_items::<Wallet>).await
    }

    pub async fn get_nonce(&self, address: &str) -> Result<u64, ApiError> {
        let uri = format!("{}/wallets/{}", self.base_url, address);
        let envelope: Envelope<WalletNonce> = self.get_json(&uri, self.request_timeout).await?;
        Ok(envelope.data.nonce)
    }

    pub async fn get_fee_policy(&self) -> Result<FeePolicy, ApiError> {
        let uri = format!("{}/node/configuration", self.base_url);
        let envelope: Envelope<NodeConfiguration> = self.get_json(&uri, self.request_timeout).await?;
        Ok(envelope.data.pool.dynamic_fees)
    }

    /// Submits transactions as `{"transactions": [...]}`.
    ///
    /// A rejected submission still carries a parseable body, so the body is
    /// decoded before the status is considered.
    pub async fn post_transactions<T: Serialize>(
        &self,
        transactions: &[T],
    ) -> Result<BroadcastResponse, ApiError> {
        let uri = format!("{}/transactions", self.base_url);
        let response = self
            .http
            .post(&uri)
            .timeout(self.request_timeout)
            .json(&json!({ "transactions": transactions }))
            .send()
            .await
            .map_err(|e| ApiError::Request(uri.clone(), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(uri.clone(), e.to_string()))?;

        match serde_json::from_str::<BroadcastResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::Status(uri, status.as_u16())),
            Err(e) => Err(ApiError::InvalidResponse(uri, e.to_string())),
        }
    }

    /// Fetches every page of a listing, parsing each page with `parse`.
    ///
    /// A non-success status ends the listing early and yields what has been
    /// collected so far. Transport and parse failures are returned as errors.
    pub async fn paginate<T, F>(
        &self,
        first_uri: String,
        timeout: Duration,
        parse: F,
    ) -> Result<Vec<T>, ApiError>
    where
        F: Fn(Vec<Value>) -> Result<Vec<T>, ApiError>,
    {
        let mut pager = Pager::new(first_uri);

        loop {
            let uri = pager.uri().to_string();
            debug!("Fetching page {}", uri);

            let response = self
                .http
                .get(&uri)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| ApiError::Request(uri.clone(), e.to_string()))?;

            if !response.status().is_success() {
                warn!(
                    "Page {} returned status {}, keeping {} entries fetched so far",
                    uri,
                    response.status().as_u16(),
                    pager.len()
                );
                return Ok(pager.into_result());
            }

            let page: Page<Value> = response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse(uri.clone(), e.to_string()))?;

            let items = parse(page.data)?;
            let next = page.meta.next.as_deref().map(|cursor| self.resolve(cursor));

            if !pager.advance(next, items) {
                return Ok(pager.into_result());
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, uri: &str, timeout: Duration) -> Result<T, ApiError> {
        let response = self
            .http
            .get(uri)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::Request(uri.to_string(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Status(uri.to_string(), response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(uri.to_string(), e.to_string()))
    }
}
