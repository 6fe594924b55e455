//! Shared infrastructure for the HTTP clients.
//!
//! Both clients reuse `FetchClient`: a blocking `reqwest` client with a
//! per-source timeout and user agent, plus status classification. Requests
//! are single-attempt; a failure is reported to the caller, which decides
//! whether it is fatal (inventory connection) or degrades one item.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use mediagrid_recon::CatalogError;

pub(super) const USER_AGENT: &str = concat!("mgrid/", env!("CARGO_PKG_VERSION"));

/// Longest response excerpt quoted in a parse error.
const BODY_EXCERPT: usize = 200;

#[derive(Debug)]
pub enum FetchError {
    /// Transport failure: DNS, refused connection, timeout, TLS.
    Network(String),
    /// Non-success status other than 404.
    Status { status: u16, url: String },
    /// Body was not the JSON shape we expected.
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status { status, url } => write!(f, "HTTP {status} from {url}"),
            Self::Parse(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<FetchError> for CatalogError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(msg) => CatalogError::Network(msg),
            FetchError::Status { status, url } => CatalogError::Http { status, url },
            FetchError::Parse(msg) => CatalogError::Parse(msg),
        }
    }
}

pub(super) struct FetchClient {
    http: reqwest::blocking::Client,
    source_name: &'static str,
}

impl FetchClient {
    pub(super) fn new(source_name: &'static str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build {source_name} HTTP client: {e}")))?;

        Ok(Self { http, source_name })
    }

    /// Make a single GET request and decode the JSON body.
    ///
    /// `build_request` receives the underlying client and returns a fully
    /// configured `RequestBuilder`. HTTP 404 yields `Ok(None)`.
    pub(super) fn get_json<T: DeserializeOwned>(
        &self,
        build_request: impl FnOnce(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<Option<T>, FetchError> {
        let resp = build_request(&self.http)
            .send()
            .map_err(|e| FetchError::Network(format!("{}: {e}", self.source_name)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: resp.url().to_string() });
        }

        // Read as text first so BOM-prefixed bodies still parse
        let text = resp
            .text()
            .map_err(|e| FetchError::Network(format!("failed to read {} response body: {e}", self.source_name)))?;
        let trimmed = text.trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).map(Some).map_err(|e| {
            let excerpt: String = trimmed.chars().take(BODY_EXCERPT).collect();
            FetchError::Parse(format!("{} JSON: {e} (body: {excerpt})", self.source_name))
        })
    }

    /// Like [`get_json`](Self::get_json), but a 404 is an error too.
    pub(super) fn get_json_required<T: DeserializeOwned>(
        &self,
        url: &str,
        build_request: impl FnOnce(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<T, FetchError> {
        self.get_json(build_request)?
            .ok_or_else(|| FetchError::Status { status: 404, url: url.to_string() })
    }
}
