//! HTTP transport seam.
//!
//! The client only needs "POST this JSON, tell me the status and body". The
//! [`Transport`] trait keeps that seam narrow so tests and dry runs can swap
//! in their own implementation.

use crate::error::SwimError;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

/// A single JSON POST.
#[derive(Debug, Clone)]
pub struct PostRequest<'a> {
    pub url: &'a str,
    pub body: &'a str,
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Failure before any HTTP status was received.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
}

pub trait Transport {
    fn post(&self, request: &PostRequest<'_>) -> Result<TransportResponse, TransportError>;
}

/// Blocking reqwest transport.
///
/// Each call blocks the calling thread until the response arrives or the
/// request timeout elapses (30 s by default). Callers on a simulator frame
/// callback should run the session off the render thread or lower the timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(verify_ssl: bool) -> Result<Self, SwimError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &PostRequest<'_>) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .post(request.url)
            .timeout(request.timeout)
            .body(request.body.to_string());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(map_reqwest_error)?;

        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
