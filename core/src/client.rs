//! Synchronous HTTP client.
//!
//! # Design
//! `HttpClient` holds a default `ClientConfig` and a `Transport` and carries
//! no state between calls: each request returns its own `Response`. Per-call
//! overrides are merged over the defaults before the transport sees them.
//! The verb helpers mirror the common shape (URL, data, headers); `send`
//! takes a fully described `Request` when overrides are needed.

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::http::{Header, HttpMethod, Request, RequestData};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// Blocking HTTP client.
#[derive(Debug, Clone, Default)]
pub struct HttpClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl HttpClient<UreqTransport> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: UreqTransport,
        }
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `url`, sending `data` as a query string.
    pub fn get(&self, url: &str, data: &RequestData, headers: &[Header]) -> Result<Response, HttpError> {
        self.send(&with_data(HttpMethod::Get, url, data, headers))
    }

    /// POST `url`, sending `data` as a JSON body.
    pub fn post(&self, url: &str, data: &RequestData, headers: &[Header]) -> Result<Response, HttpError> {
        self.send(&with_data(HttpMethod::Post, url, data, headers))
    }

    pub fn put(&self, url: &str, data: &RequestData, headers: &[Header]) -> Result<Response, HttpError> {
        self.send(&with_data(HttpMethod::Put, url, data, headers))
    }

    pub fn patch(&self, url: &str, data: &RequestData, headers: &[Header]) -> Result<Response, HttpError> {
        self.send(&with_data(HttpMethod::Patch, url, data, headers))
    }

    /// DELETE `url`. Deletes never carry data.
    pub fn delete(&self, url: &str, headers: &[Header]) -> Result<Response, HttpError> {
        self.send(&Request::delete(url).headers(headers))
    }

    /// Execute `request` with its overrides merged over the client defaults.
    pub fn send(&self, request: &Request) -> Result<Response, HttpError> {
        let prepared = request.prepare()?;
        let config = self.config.merge(&request.overrides);
        debug!(
            method = %prepared.method,
            url = %prepared.url,
            headers = prepared.headers.len(),
            has_body = prepared.body.is_some(),
            "sending request"
        );

        let raw = self.transport.execute(&prepared, &config).map_err(|err| {
            warn!(method = %prepared.method, url = %prepared.url, error = %err, "request failed");
            err
        })?;

        let response = Response::from(raw);
        debug!(status = response.status_code(), "received response");
        Ok(response)
    }
}

fn with_data(method: HttpMethod, url: &str, data: &RequestData, headers: &[Header]) -> Request {
    Request::new(method, url).data(data.clone()).headers(headers)
}
