//! Blocking reqwest transport

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::ports::{HttpRequest, HttpResponse, Method, Transport};

/// Transport backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            DomainError::Transport(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            DomainError::Transport("Unable to connect to the ShopTrack server".to_string())
        } else {
            DomainError::Transport(format!("Request failed: {}", error))
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> DomainResult<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.map_request_error(e))?;

        Ok(HttpResponse { status, body })
    }
}
