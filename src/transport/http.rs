//! Live HTTPS transport
//!
//! Cookies are handled explicitly: the request's jar is sent as a `Cookie`
//! header and the cookies set by the server are collected into a fresh jar.
//! The reqwest client itself keeps no cookie store, so nothing leaks between
//! calls that the session did not ask for.

use super::{ApiRequest, ApiResponse, CookieJar, Method, Transport};
use crate::types::BankError;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Client;
use std::time::Duration;

/// Transport talking to the real website
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport
    ///
    /// # Arguments
    ///
    /// * `ssl_verify` - Whether TLS certificates are verified
    /// * `timeout` - Per-request timeout
    pub fn new(ssl_verify: bool, timeout: Duration) -> Result<Self, BankError> {
        if !ssl_verify {
            tracing::warn!("TLS certificate verification is disabled");
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(!ssl_verify)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, BankError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }
        if let Some(header) = request.cookies.header_value() {
            builder = builder.header(COOKIE, header);
        }

        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let cookies: CookieJar = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await?;

        tracing::debug!(status, cookies = cookies.len(), "received response");

        Ok(ApiResponse {
            status,
            body,
            cookies,
        })
    }
}
