//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, StreamingResponse},
    logging::redact_url,
};
use futures_util::TryStreamExt;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// User agent sent when the host does not configure one
pub const DEFAULT_USER_AGENT: &str = concat!("file-access-core/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// Provides streaming HTTP with:
/// - Connection pooling via reqwest
/// - rustls TLS
/// - Redirect following (reqwest default policy, up to 10 hops)
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Duration::from_secs(10), None, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with explicit timeouts
    ///
    /// `request_timeout` caps the whole exchange including the body; leave it
    /// unset for large downloads.
    pub fn with_config(
        connect_timeout: Duration,
        request_timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(user_agent);

        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Wrap a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    /// Classify a reqwest failure
    ///
    /// Builder errors (bad URL, bad header) are caller mistakes; everything
    /// else happened on the wire.
    fn map_error(e: reqwest::Error) -> BridgeError {
        if e.is_builder() {
            BridgeError::OperationFailed(format!("Invalid request: {}", e))
        } else if e.is_timeout() {
            BridgeError::Network(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            BridgeError::Network(format!("Connection failed: {}", e))
        } else {
            BridgeError::Network(e.to_string())
        }
    }

    /// Flatten a header map, joining repeated headers with `", "`
    fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        let mut collected: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let Ok(value) = value.to_str() else {
                continue;
            };
            collected
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        collected
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<StreamingResponse> {
        debug!(
            method = %request.method,
            url = %redact_url(&request.url),
            "Sending HTTP request"
        );

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors print the full request URL
                let e = e.without_url();
                warn!(error = %e, "HTTP request failed");
                Self::map_error(e)
            })?;

        let status = response.status();
        let headers = Self::collect_headers(response.headers());
        let url = response.url().to_string();
        let content_length = response.content_length();

        debug!(
            status = status.as_u16(),
            url = %redact_url(&url),
            "Received HTTP response head"
        );

        let body = response.bytes_stream().map_err(Self::map_error);

        Ok(StreamingResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url,
            content_length,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned response on a local port
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn test_client() -> ReqwestHttpClient {
        ReqwestHttpClient::with_client(Client::builder().no_proxy().build().unwrap())
    }

    async fn read_body(response: StreamingResponse) -> Vec<u8> {
        let mut body = response.body;
        let mut out = Vec::new();
        while let Some(chunk) = body.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Options),
            reqwest::Method::OPTIONS
        );
    }

    #[test]
    fn test_collect_headers_joins_repeats() {
        let mut map = reqwest::header::HeaderMap::new();
        map.append("set-cookie", "a=1".parse().unwrap());
        map.append("set-cookie", "b=2".parse().unwrap());
        map.insert("content-type", "text/plain".parse().unwrap());

        let headers = ReqwestHttpClient::collect_headers(&map);
        assert_eq!(headers.get("set-cookie"), Some(&"a=1, b=2".to_string()));
        assert_eq!(headers.get("content-type"), Some(&"text/plain".to_string()));
    }

    #[tokio::test]
    async fn test_streams_success_body() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nX-Test: yes\r\nConnection: close\r\n\r\nhello",
        )
        .await;

        let response = test_client()
            .send(HttpRequest::new(HttpMethod::Get, format!("{}/file", url)))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.content_length, Some(5));
        assert_eq!(response.headers.get("x-test"), Some(&"yes".to_string()));
        assert!(response.url.ends_with("/file"));
        assert_eq!(read_body(response).await, b"hello");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\nConnection: close\r\n\r\nmissing",
        )
        .await;

        let response = test_client()
            .send(HttpRequest::new(HttpMethod::Get, url))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(read_body(response).await, b"missing");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_logged_urls_drop_query_tokens() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
            .await;
        let response = test_client()
            .send(HttpRequest::new(
                HttpMethod::Get,
                format!("{}/file.zip?sig=secret123", url),
            ))
            .await
            .unwrap();
        assert_eq!(read_body(response).await, b"ok");

        let refused = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let _ = test_client()
            .send(HttpRequest::new(
                HttpMethod::Get,
                format!("http://{}/x?sig=secret456", refused),
            ))
            .await;

        let text = logs.text();
        assert!(text.contains("Sending HTTP request"));
        assert!(text.contains("/file.zip?[REDACTED]"));
        assert!(text.contains("HTTP request failed"));
        assert!(!text.contains("secret123"));
        assert!(!text.contains("secret456"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = test_client()
            .send(HttpRequest::new(HttpMethod::Get, format!("http://{}", addr)))
            .await;

        assert!(matches!(result, Err(BridgeError::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_operation_failure() {
        let result = test_client()
            .send(HttpRequest::new(HttpMethod::Get, "not a url"))
            .await;

        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }
}
