//! Transport module
//!
//! Every network exchange of the client goes through the [`Transport`] trait.
//! Components describe the logical call with an [`ApiRequest`] (URL, query,
//! form, cookies, and the name of the fixture that stands for it) and get back
//! an [`ApiResponse`] with status, body and the cookies the server set.
//!
//! # Components
//!
//! - `cookies` - Explicit cookie jar with merge semantics
//! - `http` - Live HTTPS transport backed by reqwest
//! - `mock` - File-backed replay transport and recording decorator
//!
//! Swapping the live transport for the mock one never changes the control flow
//! of a component: only the source and sink of the bytes differ.

pub mod cookies;
pub mod http;
pub mod mock;
#[cfg(test)]
pub(crate) mod testing;

pub use cookies::CookieJar;
pub use http::HttpTransport;
pub use mock::{MockConfig, MockTransport, RecordingTransport};

use crate::config::ClientConfig;
use crate::types::BankError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// What a fixture file holds for a call
///
/// Most calls are replayed from their response body. The security check is
/// only interesting for the cookies it sets, so its fixture stores those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureContent {
    /// The response body (JSON)
    Body,
    /// The response cookies as a flat JSON object
    Cookies,
    /// Nothing worth keeping; recorded as `{}`
    Empty,
}

/// A logical call to one of the bank endpoints
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Form-encoded body, for POST requests that carry one
    pub form: Option<Vec<(String, String)>>,
    /// Cookies presented with the request
    pub cookies: CookieJar,
    /// Base name of the fixture standing for this call
    pub fixture: String,
    /// What the fixture holds
    pub fixture_content: FixtureContent,
}

impl ApiRequest {
    /// Create a GET request replayed from `fixture`
    pub fn get(url: impl Into<String>, fixture: impl Into<String>) -> Self {
        Self::new(Method::Get, url.into(), fixture.into())
    }

    /// Create a POST request replayed from `fixture`
    pub fn post(url: impl Into<String>, fixture: impl Into<String>) -> Self {
        Self::new(Method::Post, url.into(), fixture.into())
    }

    fn new(method: Method, url: String, fixture: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            form: None,
            cookies: CookieJar::new(),
            fixture,
            fixture_content: FixtureContent::Body,
        }
    }

    /// Append a query parameter
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the form-encoded body
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    /// Present these cookies with the request
    pub fn cookies(mut self, cookies: &CookieJar) -> Self {
        self.cookies = cookies.clone();
        self
    }

    /// Choose what the fixture for this call holds
    pub fn fixture_content(mut self, content: FixtureContent) -> Self {
        self.fixture_content = content;
        self
    }

    /// Value of a query parameter
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a form field
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// Form values can hold the mapped credential; only field names are printed.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form_fields: Option<Vec<&str>> = self
            .form
            .as_ref()
            .map(|fields| fields.iter().map(|(k, _)| k.as_str()).collect());
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("form_fields", &form_fields)
            .field("cookies", &self.cookies.len())
            .field("fixture", &self.fixture)
            .finish()
    }
}

/// Response to an [`ApiRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Cookies set by the server on this response
    pub cookies: CookieJar,
}

impl ApiResponse {
    /// A 200 response with the given body and no cookies
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            cookies: CookieJar::new(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform one request/response exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange
    ///
    /// A non-success HTTP status is NOT an error at this level; callers map it
    /// to the error variant of their endpoint. Errors are reserved for
    /// exchanges that produced no response at all.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, BankError>;
}

/// Build the transport selected by the configuration
///
/// - `use_dir` set: replay fixtures instead of reaching the network
/// - `write_dir` set: record every successful response as a fixture
pub fn build_transport(
    config: &ClientConfig,
    mocks: &MockConfig,
) -> Result<Arc<dyn Transport>, BankError> {
    let base: Arc<dyn Transport> = match &mocks.use_dir {
        Some(dir) => {
            tracing::info!("replaying fixtures from {}", dir.display());
            Arc::new(MockTransport::new(dir.clone(), mocks.use_suffix.clone()))
        }
        None => Arc::new(HttpTransport::new(
            config.ssl_verify,
            config.request_timeout(),
        )?),
    };

    match &mocks.write_dir {
        Some(dir) => {
            tracing::info!("recording fixtures into {}", dir.display());
            Ok(Arc::new(RecordingTransport::new(
                base,
                dir.clone(),
                mocks.write_suffix.clone(),
            )))
        }
        None => Ok(base),
    }
}
