//! A client that remembers its last response.
//!
//! `Session` keeps a single response slot. Each request replaces it; a failed
//! request clears it so the accessors never report a previous call's data.
//! Request methods return `&mut Self` so calls chain into the accessors.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::headers::{HeaderList, HeaderLookup};
use crate::http::{Header, HttpMethod, Request, RequestData};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Default)]
pub struct Session<T = UreqTransport> {
    client: HttpClient<T>,
    last: Option<Response>,
}

impl Session<UreqTransport> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::from_client(HttpClient::with_config(config))
    }
}

impl<T: Transport> Session<T> {
    pub fn from_client(client: HttpClient<T>) -> Self {
        Self { client, last: None }
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    pub fn get(&mut self, url: &str, data: &RequestData, headers: &[Header]) -> Result<&mut Self, HttpError> {
        self.send(&Request::get(url).data(data.clone()).headers(headers))
    }

    pub fn post(&mut self, url: &str, data: &RequestData, headers: &[Header]) -> Result<&mut Self, HttpError> {
        self.send(&Request::post(url).data(data.clone()).headers(headers))
    }

    pub fn put(&mut self, url: &str, data: &RequestData, headers: &[Header]) -> Result<&mut Self, HttpError> {
        self.send(&Request::put(url).data(data.clone()).headers(headers))
    }

    pub fn patch(&mut self, url: &str, data: &RequestData, headers: &[Header]) -> Result<&mut Self, HttpError> {
        self.send(&Request::patch(url).data(data.clone()).headers(headers))
    }

    pub fn delete(&mut self, url: &str, headers: &[Header]) -> Result<&mut Self, HttpError> {
        self.send(&Request::new(HttpMethod::Delete, url).headers(headers))
    }

    /// Execute `request` and store its response in place of the previous one.
    pub fn send(&mut self, request: &Request) -> Result<&mut Self, HttpError> {
        self.last = None;
        self.last = Some(self.client.send(request)?);
        Ok(self)
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last.as_ref()
    }

    /// Hand out the stored response, leaving the slot empty.
    pub fn take_response(&mut self) -> Option<Response> {
        self.last.take()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.last.as_ref().map(Response::status_code)
    }

    pub fn headers(&self) -> Option<&HeaderList> {
        self.last.as_ref()?.headers()
    }

    pub fn header(&self, name: &str) -> HeaderLookup<'_> {
        match &self.last {
            Some(response) => response.header(name),
            None => HeaderLookup::NoHeaders,
        }
    }

    pub fn body(&self) -> Option<&str> {
        self.last.as_ref().map(Response::body)
    }

    pub fn json(&self) -> Result<Map<String, Value>, HttpError> {
        self.response()?.json()
    }

    pub fn object(&self) -> Result<Value, HttpError> {
        self.response()?.object()
    }

    pub fn json_as<D: DeserializeOwned>(&self) -> Result<D, HttpError> {
        self.response()?.json_as()
    }

    fn response(&self) -> Result<&Response, HttpError> {
        self.last.as_ref().ok_or(HttpError::NoResponse)
    }
}
