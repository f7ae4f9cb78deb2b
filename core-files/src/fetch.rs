//! Network fetch-to-file
//!
//! A fetch runs on its own task and streams the response body straight to
//! disk through a [`StagedFile`], so the destination only ever holds a
//! complete body. The caller gets a [`FetchHandle`] back immediately: await
//! it for the [`FetchResult`], watch its progress, or cancel it.
//!
//! Non-2xx responses are not errors. Their body is written like any other
//! and `ok` is `false`; only transport failures become `NetworkError`.

use crate::error::{FileAccessError, Result};
use crate::io::StagedFile;
use crate::locks::{PathGuard, PathLocks};
use crate::paths::ensure_absolute;
use bridge_traits::{BridgeError, ByteStream, HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use core_async::io::AsyncWriteExt;
use core_async::sync::{watch, CancellationToken};
use core_async::task::JoinHandle;
use core_runtime::logging::redact_url;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Request options
#[derive(Debug, Clone, Default)]
pub struct FetchInit {
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Destination; a fresh file under the cache directory when unset
    pub path: Option<PathBuf>,
}

impl FetchInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the method from its name, case-insensitively
    pub fn method_name(self, name: &str) -> Result<Self> {
        let method = name.parse::<HttpMethod>().map_err(|_| {
            FileAccessError::InvalidArgument(format!("Unsupported HTTP method: {}", name))
        })?;
        Ok(self.method(method))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Outcome of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub status_code: u16,
    pub status_text: String,
    /// Lowercase names; repeated headers joined with `", "`
    pub headers: HashMap<String, String>,
    /// Final URL after redirects
    pub url: String,
    pub redirected: bool,
    /// Where the body was written
    pub path: PathBuf,
    /// `status_code` is in `200..300`
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchProgress {
    pub bytes_written: u64,
    /// Declared body length, when the server sent one
    pub content_length: Option<u64>,
}

/// An in-flight fetch
///
/// Awaiting the handle yields the result exactly once. Dropping it does not
/// stop the transfer; call [`cancel`](Self::cancel) for that.
pub struct FetchHandle {
    path: PathBuf,
    token: CancellationToken,
    progress: watch::Receiver<FetchProgress>,
    join: JoinHandle<Result<FetchResult>>,
}

impl FetchHandle {
    /// Destination the body is written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Abort the transfer
    ///
    /// The partial body is removed and the handle resolves to
    /// [`FileAccessError::Cancelled`]. A no-op once the transfer finished.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn progress(&self) -> watch::Receiver<FetchProgress> {
        self.progress.clone()
    }
}

impl Future for FetchHandle {
    type Output = Result<FetchResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FileAccessError::Cancelled),
            Err(e) => Err(FileAccessError::Unavailable(format!(
                "Fetch task failed: {}",
                e
            ))),
        })
    }
}

impl fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("path", &self.path)
            .field("cancelled", &self.token.is_cancelled())
            .field("progress", &*self.progress.borrow())
            .finish()
    }
}

/// Spawns fetch jobs
#[derive(Clone)]
pub struct FetchEngine {
    http: Arc<dyn HttpClient>,
    cache_dir: PathBuf,
    request_timeout: Option<Duration>,
    locks: PathLocks,
}

impl FetchEngine {
    pub fn new(
        http: Arc<dyn HttpClient>,
        cache_dir: PathBuf,
        request_timeout: Option<Duration>,
        locks: PathLocks,
    ) -> Self {
        Self {
            http,
            cache_dir,
            request_timeout,
            locks,
        }
    }

    /// Validate the request, take the destination's lock and start the transfer
    ///
    /// The lock is acquired before this returns, so operations issued on the
    /// same path afterwards queue behind the download. Must be called from
    /// within the runtime.
    pub async fn start(
        &self,
        resource: impl Into<String>,
        init: FetchInit,
    ) -> Result<FetchHandle> {
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err(FileAccessError::InvalidArgument(
                "Fetch URL must not be empty".to_string(),
            ));
        }

        let path = match &init.path {
            Some(path) => {
                ensure_absolute(path)?;
                path.clone()
            }
            None => self.cache_dir.join(uuid::Uuid::new_v4().to_string()),
        };

        let guard = self.locks.lock(&path).await;
        let token = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(FetchProgress::default());

        let job = FetchJob {
            http: Arc::clone(&self.http),
            _guard: guard,
            request_timeout: self.request_timeout,
            resource,
            init,
            path: path.clone(),
            token: token.clone(),
            progress: progress_tx,
        };

        Ok(FetchHandle {
            path,
            token,
            progress: progress_rx,
            join: core_async::spawn(job.run()),
        })
    }
}

struct FetchJob {
    http: Arc<dyn HttpClient>,
    // Held for the whole transfer; released when the job finishes
    _guard: PathGuard,
    request_timeout: Option<Duration>,
    resource: String,
    init: FetchInit,
    path: PathBuf,
    token: CancellationToken,
    progress: watch::Sender<FetchProgress>,
}

impl FetchJob {
    #[instrument(
        name = "fetch",
        skip(self),
        fields(url = %redact_url(&self.resource), method = %self.init.method)
    )]
    async fn run(self) -> Result<FetchResult> {
        self.check_destination().await?;

        let response = self
            .token
            .run_until_cancelled(self.http.send(self.request()))
            .await
            .ok_or(FileAccessError::Cancelled)?
            .map_err(|e| self.send_error(e))?;

        debug!(status = response.status, "Received response head");

        let status = response.status;
        let status_text = response.status_text;
        let headers = response.headers;
        let final_url = if response.url.is_empty() {
            self.resource.clone()
        } else {
            response.url
        };

        let mut staged = StagedFile::create(&self.path).await?;
        let written = match self
            .stream_body(&mut staged, response.body, response.content_length)
            .await
        {
            Ok(written) => written,
            Err(e) => {
                staged.discard().await;
                debug!(error = %e, "Fetch aborted, partial body removed");
                return Err(e);
            }
        };
        staged.commit().await?;

        let result = FetchResult {
            status_code: status,
            status_text,
            headers,
            redirected: !same_url(&final_url, &self.resource),
            url: final_url,
            path: self.path.clone(),
            ok: (200..300).contains(&status),
        };

        info!(status, bytes = written, path = ?self.path, "Fetch complete");
        Ok(result)
    }

    async fn check_destination(&self) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            FileAccessError::InvalidArgument(format!(
                "Fetch destination has no parent directory: {}",
                self.path.display()
            ))
        })?;

        match core_async::fs::metadata(parent).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(FileAccessError::NotADirectory {
                path: parent.to_path_buf(),
            }),
            Err(_) => Err(FileAccessError::NotFound {
                path: parent.to_path_buf(),
            }),
        }
    }

    fn request(&self) -> HttpRequest {
        let mut request = HttpRequest::new(self.init.method, self.resource.clone())
            .headers(self.init.headers.clone());
        if let Some(body) = &self.init.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn stream_body(
        &self,
        staged: &mut StagedFile,
        mut body: ByteStream,
        content_length: Option<u64>,
    ) -> Result<u64> {
        let mut written = 0u64;
        self.progress.send_replace(FetchProgress {
            bytes_written: 0,
            content_length,
        });

        loop {
            let next = self
                .token
                .run_until_cancelled(body.next())
                .await
                .ok_or(FileAccessError::Cancelled)?;

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Err(body_error(e)),
                None => break,
            };

            staged
                .writer()?
                .write_all(&chunk)
                .await
                .map_err(|e| FileAccessError::io(&self.path, e))?;

            written += chunk.len() as u64;
            self.progress.send_replace(FetchProgress {
                bytes_written: written,
                content_length,
            });
        }

        Ok(written)
    }

    fn send_error(&self, err: BridgeError) -> FileAccessError {
        match err {
            BridgeError::OperationFailed(msg) => FileAccessError::InvalidArgument(msg),
            other => FileAccessError::bridge(&self.path, other),
        }
    }
}

fn body_error(err: BridgeError) -> FileAccessError {
    match err {
        BridgeError::Network(msg) => FileAccessError::NetworkError(msg),
        other => FileAccessError::NetworkError(other.to_string()),
    }
}

/// Compare URLs ignoring the trailing slash HTTP clients add to bare origins
fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
