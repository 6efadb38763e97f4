//! Request types: what the caller asks for and what goes on the wire.
//!
//! # Design
//! `Request` is the caller-facing description (verb, URL, key/value data,
//! headers, option overrides). `Request::prepare` turns it into an
//! `HttpRequest`, the plain-data form a `Transport` executes: the URL already
//! carries any query string and the body is already JSON. Keeping the two
//! apart means transports never see untyped data and tests can assert on the
//! prepared request without touching the network.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::config::ConfigOverrides;
use crate::error::HttpError;
use crate::query;

/// Key/value payload sent as a query string (GET) or JSON body (POST/PUT/PATCH).
pub type RequestData = serde_json::Map<String, Value>;

/// A single request header as a `(name, value)` pair.
pub type Header = (String, String);

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Case-insensitive lookup by method name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    /// Whether non-empty data is sent as a JSON body for this method.
    pub fn sends_json_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as described by the caller.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    pub data: RequestData,
    pub headers: Vec<Header>,
    pub overrides: ConfigOverrides,
}

impl Request {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: RequestData::new(),
            headers: Vec::new(),
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Replace the whole data payload.
    pub fn data(mut self, data: RequestData) -> Self {
        self.data = data;
        self
    }

    /// Add one data entry, replacing an existing entry with the same key.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: &[Header]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve data into a query string or JSON body.
    ///
    /// DELETE never carries a body, even when data was supplied.
    pub fn prepare(&self) -> Result<HttpRequest, HttpError> {
        let mut url = Url::parse(&self.url).map_err(|source| HttpError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        let mut headers = self.headers.clone();
        let mut body = None;

        if !self.data.is_empty() {
            if self.method == HttpMethod::Get {
                query::append(&mut url, &self.data);
            } else if self.method.sends_json_body() {
                body = Some(serde_json::to_string(&self.data).map_err(HttpError::Encode)?);
                if !has_header(&headers, "content-type") {
                    headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                }
            }
        }

        Ok(HttpRequest {
            method: self.method,
            url: url.into(),
            headers,
            body,
        })
    }
}

pub(crate) fn has_header(headers: &[Header], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}

/// A prepared HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: Option<String>,
}
