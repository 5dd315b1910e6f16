//! Session handle
//!
//! The session is the shared context of every call: website root, regional
//! prefix, TLS flag, transport and cookie jar. Only the authenticator writes
//! the regional prefix and the cookies, once; every other component borrows
//! the session immutably.

use crate::config::ClientConfig;
use crate::transport::{ApiRequest, ApiResponse, CookieJar, Transport};
use crate::types::BankError;
use std::fmt;
use std::sync::Arc;

/// Authenticated (or about to be) connection to the website
pub struct Session {
    base_url: String,
    regional_bank_url: Option<String>,
    ssl_verify: bool,
    page_size: usize,
    cookies: CookieJar,
    transport: Arc<dyn Transport>,
}

impl Session {
    /// Create an unauthenticated session
    ///
    /// No network call happens here; see [`crate::core::Authenticator`].
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            regional_bank_url: None,
            ssl_verify: config.ssl_verify,
            page_size: config.page_size,
            cookies: CookieJar::new(),
            transport,
        }
    }

    /// Website root, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Regional path segment, once authenticated
    pub fn regional_bank_url(&self) -> Option<&str> {
        self.regional_bank_url.as_deref()
    }

    /// Whether TLS certificates are verified by the transport
    pub fn ssl_verify(&self) -> bool {
        self.ssl_verify
    }

    /// Nominal page size of the operations feed
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Session cookies
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Transport every call goes through
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Whether the login handshake completed
    pub fn is_authenticated(&self) -> bool {
        self.regional_bank_url.is_some()
    }

    /// Store the outcome of a successful login
    pub(crate) fn install(&mut self, regional_bank_url: String, cookies: CookieJar) {
        self.regional_bank_url = Some(regional_bank_url);
        self.cookies = cookies;
    }

    /// URL of a page below the regional prefix
    ///
    /// `path` is relative, e.g. `particulier/operations/...`.
    pub fn regional_url(&self, path: &str) -> Result<String, BankError> {
        let region = self
            .regional_bank_url
            .as_deref()
            .ok_or_else(|| BankError::config("session is not authenticated"))?;
        Ok(format!("{}/{}/{}", self.base_url, region, path))
    }

    /// GET request below the regional prefix, carrying the session cookies
    pub fn get(&self, path: &str, fixture: impl Into<String>) -> Result<ApiRequest, BankError> {
        Ok(ApiRequest::get(self.regional_url(path)?, fixture).cookies(&self.cookies))
    }

    /// Send a request through the session transport
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, BankError> {
        self.transport.execute(request).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("regional_bank_url", &self.regional_bank_url)
            .field("ssl_verify", &self.ssl_verify)
            .field("page_size", &self.page_size)
            .field("cookies", &self.cookies.len())
            .finish()
    }
}
