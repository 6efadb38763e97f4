//! Transfer options applied to every request.
//!
//! # Design
//! `ClientConfig` is the full set of options a client starts with.
//! `ConfigOverrides` carries the same fields as `Option`s so a single call can
//! replace some of them; `merge` applies the present ones field by field.
//! Both derive serde so hosts can load them from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// Default whole-transfer timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of redirects followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Options applied to each transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub timeout_secs: u64,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    /// Verify server certificates. On by default; curl-based clients often
    /// turned peer verification off, so hosts relying on that must set this
    /// to `false` explicitly.
    pub verify_tls: bool,
    /// Explicit `Accept-Encoding` value. `None` leaves the choice to the
    /// transport, which advertises every encoding it can decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_encoding: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            verify_tls: true,
            accept_encoding: None,
        }
    }
}

impl ClientConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, HttpError> {
        serde_json::from_str(raw).map_err(HttpError::Decode)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Redirects the transport may follow; zero when following is disabled.
    pub fn redirect_limit(&self) -> u32 {
        if self.follow_redirects {
            self.max_redirects
        } else {
            0
        }
    }

    /// Return a copy with every option present in `overrides` replaced.
    pub fn merge(&self, overrides: &ConfigOverrides) -> ClientConfig {
        ClientConfig {
            timeout_secs: overrides.timeout_secs.unwrap_or(self.timeout_secs),
            follow_redirects: overrides.follow_redirects.unwrap_or(self.follow_redirects),
            max_redirects: overrides.max_redirects.unwrap_or(self.max_redirects),
            verify_tls: overrides.verify_tls.unwrap_or(self.verify_tls),
            accept_encoding: overrides
                .accept_encoding
                .clone()
                .or_else(|| self.accept_encoding.clone()),
        }
    }
}

/// Per-call replacements for `ClientConfig` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub timeout_secs: Option<u64>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    pub verify_tls: Option<bool>,
    pub accept_encoding: Option<String>,
}

impl ConfigOverrides {
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = Some(max);
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    pub fn accept_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.accept_encoding = Some(encoding.into());
        self
    }
}
