//! HTTP implementation of the query service.
//!
//! `GET {base}/tables` and `POST {base}/query`, both JSON. Every call is
//! attempted once; any non-success status or transport fault is returned as
//! a [`TransportError`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Envelope, QueryOutcome, QueryRequest, QueryService, TableCatalog, TransportError};
use crate::config::ServerConfig;
use crate::error::{QueryDeckError, Result};

const JSON: &str = "application/json";

/// Query service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    base_url: String,
    client: Client,
}

impl HttpQueryService {
    /// Creates a new client for the given server.
    ///
    /// No request timeout is set unless `timeout_secs` is configured.
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = server.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| QueryDeckError::connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: server.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tables_url(&self) -> String {
        format!("{}/tables", self.base_url)
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    /// Maps a reqwest send error to a transport fault description.
    fn send_fault(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::fault("Request timed out")
        } else if e.is_connect() {
            TransportError::fault(format!("Failed to connect to query service: {e}"))
        } else {
            TransportError::fault(format!("Request failed: {e}"))
        }
    }

    /// Checks the status and decodes a JSON body.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Envelope<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::fault(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| TransportError::fault(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn list_tables(&self) -> Envelope<TableCatalog> {
        debug!("GET {}", self.tables_url());
        let result = match self
            .client
            .get(self.tables_url())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(Self::send_fault(e)),
        };

        if let Err(ref e) = result {
            warn!("Listing tables failed: {}", e);
        }
        result
    }

    async fn execute(&self, request: &QueryRequest) -> Envelope<QueryOutcome> {
        debug!("POST {} ({} bytes)", self.query_url(), request.content.len());
        let result = match self
            .client
            .post(self.query_url())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .json(request)
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(Self::send_fault(e)),
        };

        if let Err(ref e) = result {
            warn!("Query request failed: {}", e);
        }
        result
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
