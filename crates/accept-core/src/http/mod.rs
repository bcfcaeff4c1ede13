//! The accept request: what is sent, how the answer is classified.

mod wire;

pub use wire::{
    REQUEST_HEAD_BYTES, RequestHead, ResponseHead, exchange, find_header_end,
    parse_content_length, parse_head, parse_status_line, write_request,
};

use core::fmt;

use log::{info, warn};

use crate::{config::NetworkConfig, error::TransportError};

pub const ACCEPT_PATH: &str = "/accept";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Bytes kept from a response; the rest of a long body is dropped.
pub const RESPONSE_BUFFER_BYTES: usize = 512;

/// One outgoing request, timeout included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AcceptRequest<'a> {
    pub method: &'static str,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
    pub content_type: &'a str,
    pub body: &'a [u8],
    /// Total budget for connect, send and receive.
    pub timeout_ms: u64,
}

impl<'a> AcceptRequest<'a> {
    /// `POST /accept` with an empty JSON-typed body.
    pub const fn accept(config: &'a NetworkConfig, timeout_ms: u64) -> Self {
        Self {
            method: "POST",
            host: config.host,
            port: config.port,
            path: ACCEPT_PATH,
            content_type: JSON_CONTENT_TYPE,
            body: &[],
            timeout_ms,
        }
    }
}

/// Status plus whatever body bytes fit the caller's buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HttpResponse<'b> {
    pub status: u16,
    pub body: &'b [u8],
}

/// HTTP/1.1 client used for the accept call.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// Performs the request, honoring `request.timeout_ms` as a hard bound.
    async fn post<'b>(
        &mut self,
        request: &AcceptRequest<'_>,
        response_buf: &'b mut [u8],
    ) -> Result<HttpResponse<'b>, TransportError>;
}

/// Classified result of one dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    HttpError(u16),
    TransportError(TransportError),
}

impl Outcome {
    /// Only 200 counts as accepted.
    pub const fn from_status(status: u16) -> Self {
        if status == 200 {
            Self::Success
        } else {
            Self::HttpError(status)
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Issues the accept request; never retries and never touches the display.
#[derive(Debug)]
pub struct RequestDispatcher {
    timeout_ms: u64,
    response: [u8; RESPONSE_BUFFER_BYTES],
    sent: u32,
}

impl RequestDispatcher {
    pub const fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            response: [0; RESPONSE_BUFFER_BYTES],
            sent: 0,
        }
    }

    /// Sends one accept request. Caller checks the link beforehand.
    pub async fn send_accept<T: HttpTransport>(
        &mut self,
        transport: &mut T,
        config: &NetworkConfig,
    ) -> Outcome {
        let request = AcceptRequest::accept(config, self.timeout_ms);
        self.sent = self.sent.wrapping_add(1);
        info!(
            "http: {} http://{}:{}{} timeout_ms={}",
            request.method, request.host, request.port, request.path, request.timeout_ms
        );

        match transport.post(&request, &mut self.response).await {
            Ok(response) => {
                info!(
                    "http: response ({}): {}",
                    response.status,
                    LossyBody(response.body)
                );
                Outcome::from_status(response.status)
            }
            Err(err) => {
                warn!("http: request failed: {}", err);
                Outcome::TransportError(err)
            }
        }
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub const fn sent(&self) -> u32 {
        self.sent
    }
}

/// Formats body bytes as text, replacing invalid UTF-8.
pub struct LossyBody<'a>(pub &'a [u8]);

impl fmt::Display for LossyBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
