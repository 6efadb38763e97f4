//! Synchronous HTTP client core.
//!
//! # Overview
//! Issues GET/POST/PUT/PATCH/DELETE requests through a blocking transfer
//! library and exposes each response as a status code, parsed header blocks
//! and a body with JSON views.
//!
//! # Design
//! - `Request` describes a call; `Request::prepare` resolves its data into a
//!   query string (GET) or JSON body (POST/PUT/PATCH) and yields an
//!   `HttpRequest`.
//! - `Transport` executes prepared requests. `UreqTransport` is the default;
//!   tests plug in their own.
//! - `HttpClient` is stateless and returns a `Response` per call.
//!   `Session` wraps it with a single last-response slot.
//! - Headers are parsed once into `HeaderList` values when a response is
//!   built.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod query;
pub mod response;
pub mod session;
pub mod transport;

pub use client::HttpClient;
pub use config::{ClientConfig, ConfigOverrides};
pub use error::HttpError;
pub use headers::{HeaderList, HeaderLookup, STATUS_LINE_KEY};
pub use http::{Header, HttpMethod, HttpRequest, Request, RequestData};
pub use response::{RawResponse, Response};
pub use session::Session;
pub use transport::{Transport, UreqTransport};
