//! HTTP Client Abstraction
//!
//! Streaming HTTP contract used by the fetch-to-file engine. Responses expose
//! their body as a stream of byte chunks so that callers can write them to
//! disk without buffering the whole payload.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(BridgeError::OperationFailed(format!(
                "Unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Boxed stream of body chunks.
///
/// A chunk error means the transfer broke mid-body (connection reset, TLS
/// failure, timeout) and must be treated as a network failure.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// HTTP response whose body has not been read yet
pub struct StreamingResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown
    pub status_text: String,
    /// Header names are lowercase; repeated headers are joined with `", "`
    pub headers: HashMap<String, String>,
    /// Final URL after redirects
    pub url: String,
    /// Declared body length, if the server sent one
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl StreamingResponse {
    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Async HTTP client trait
///
/// Implementations should handle TLS, redirects and connection pooling, and
/// must report every transport failure (DNS, TLS, connect, reset) as
/// [`BridgeError::Network`]. Non-2xx statuses are not errors: they are
/// returned as regular responses.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
/// use futures_util::StreamExt;
///
/// async fn count_bytes(client: &dyn HttpClient) -> Result<u64> {
///     let request = HttpRequest::new(HttpMethod::Get, "https://example.com/file.bin");
///     let mut response = client.send(request).await?;
///     let mut total = 0;
///     while let Some(chunk) = response.body.next().await {
///         total += chunk?.len() as u64;
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and return once the response head has arrived
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Network`] if the connection cannot be
    /// established or the request times out before the head arrives.
    async fn send(&self, request: HttpRequest) -> Result<StreamingResponse>;
}
