//! The seam between request preparation and network I/O.
//!
//! # Design
//! `Transport` executes one prepared request with a fully merged config and
//! reports the raw result. `UreqTransport` is the production implementation.
//! It renders the status line and headers back into a CRLF header section so
//! every transport feeds the same `Response` parsing path. Status codes are
//! data here: a 404 is a successful transfer. Bodies are read in full with no
//! size cap.

use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::config::Config;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::http::{has_header, HttpMethod, HttpRequest};
use crate::response::RawResponse;

/// Executes prepared requests.
pub trait Transport {
    fn execute(&self, request: &HttpRequest, config: &ClientConfig) -> Result<RawResponse, HttpError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest, config: &ClientConfig) -> Result<RawResponse, HttpError> {
        (**self).execute(request, config)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(config: &ClientConfig) -> Agent {
        Agent::new_with_config(Self::agent_config(config))
    }

    fn agent_config(config: &ClientConfig) -> Config {
        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .max_redirects(config.redirect_limit())
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!config.verify_tls)
                    .build(),
            )
            .build()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, config: &ClientConfig) -> Result<RawResponse, HttpError> {
        let agent = Self::agent(config);
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), request, config).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), request, config).call(),
            HttpMethod::Post => send(with_headers(agent.post(url), request, config), body),
            HttpMethod::Put => send(with_headers(agent.put(url), request, config), body),
            HttpMethod::Patch => send(with_headers(agent.patch(url), request, config), body),
        };

        let response = result.map_err(HttpError::transport)?;
        into_raw(response)
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    request: &HttpRequest,
    config: &ClientConfig,
) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    // A caller-supplied Accept-Encoding wins over the configured one.
    if let Some(encoding) = config.accept_encoding.as_deref() {
        if !has_header(&request.headers, "accept-encoding") {
            builder = builder.header("Accept-Encoding", encoding);
        }
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn into_raw(mut response: ureq::http::Response<Body>) -> Result<RawResponse, HttpError> {
    let status = response.status();
    let mut head = format!("{:?} {}", response.version(), status.as_u16());
    if let Some(reason) = status.canonical_reason() {
        head.push(' ');
        head.push_str(reason);
    }
    head.push_str("\r\n");
    for (name, value) in response.headers() {
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let header_size = head.len();
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(HttpError::transport)?;
    debug!(status = status.as_u16(), header_size, body_len = body.len(), "transfer complete");

    let mut raw = head.into_bytes();
    raw.extend_from_slice(&body);
    Ok(RawResponse::new(status.as_u16(), raw, header_size))
}
