//! # Engine Configuration
//!
//! A builder assembles [`FileAccessConfig`]: the platform bridges the engine
//! consumes plus a handful of tunables. Validation is fail-fast so a host
//! learns about a missing capability at startup, not on the first `fetch`.
//!
//! ## Bridges
//!
//! | Bridge | Used by | Desktop default |
//! |---|---|---|
//! | `HttpClient` | `fetch` | `ReqwestHttpClient` |
//! | `PlatformDirectories` | directory table, `cp_external` | `DesktopDirectories` |
//! | `AssetSource` | `cp_asset` | `BundleAssetSource` over the bundle dir |
//! | `StorageGrant` | `cp_external` | `DesktopStorageGrant` (all granted) |
//! | `VolumeInfo` | `df` | `SysinfoVolumes` |
//!
//! With the `desktop-shims` feature, any bridge left unset is filled with
//! its desktop default. Without it, a missing bridge fails the build with
//! [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::FileAccessConfig;
//! use std::time::Duration;
//!
//! let config = FileAccessConfig::builder()
//!     .app_name("com.example.notes")
//!     .chunk_size(256 * 1024)
//!     .request_timeout(Duration::from_secs(300))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AssetSource, HttpClient, PlatformDirectories, StorageGrant, VolumeInfo};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Chunk size used by streaming copies, hashing and concatenation
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const MIN_CHUNK_SIZE: usize = 4 * 1024;
pub const MAX_CHUNK_SIZE: usize = 8 * 1024 * 1024;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Namespace for the desktop directory layout
pub const DEFAULT_APP_NAME: &str = "file-access";

pub const DEFAULT_USER_AGENT: &str = concat!("file-access-core/", env!("CARGO_PKG_VERSION"));

/// Engine configuration
///
/// Use [`FileAccessConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct FileAccessConfig {
    pub http_client: Arc<dyn HttpClient>,
    pub directories: Arc<dyn PlatformDirectories>,
    pub asset_source: Arc<dyn AssetSource>,
    pub storage_grant: Arc<dyn StorageGrant>,
    pub volume_info: Arc<dyn VolumeInfo>,

    /// Buffer size for every streaming operation
    pub chunk_size: usize,

    /// Cap on a whole fetch, body included; `None` leaves downloads unbounded
    pub request_timeout: Option<Duration>,

    pub connect_timeout: Duration,

    pub user_agent: String,
}

impl fmt::Debug for FileAccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAccessConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("directories", &"PlatformDirectories { ... }")
            .field("asset_source", &"AssetSource { ... }")
            .field("storage_grant", &"StorageGrant { ... }")
            .field("volume_info", &"VolumeInfo { ... }")
            .field("chunk_size", &self.chunk_size)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl FileAccessConfig {
    pub fn builder() -> FileAccessConfigBuilder {
        FileAccessConfigBuilder::default()
    }

    /// Checks the tunables
    ///
    /// - chunk size within [`MIN_CHUNK_SIZE`, `MAX_CHUNK_SIZE`]
    /// - non-zero timeouts
    /// - non-empty user agent
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(Error::Config(format!(
                "Chunk size {} is outside the supported range {}..={} bytes",
                self.chunk_size, MIN_CHUNK_SIZE, MAX_CHUNK_SIZE
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::Config(
                "Connect timeout must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config(
                "Request timeout must be greater than zero. Leave it unset for no limit."
                    .to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for [`FileAccessConfig`]
#[derive(Default)]
pub struct FileAccessConfigBuilder {
    app_name: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    directories: Option<Arc<dyn PlatformDirectories>>,
    asset_source: Option<Arc<dyn AssetSource>>,
    storage_grant: Option<Arc<dyn StorageGrant>>,
    volume_info: Option<Arc<dyn VolumeInfo>>,
    chunk_size: Option<usize>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl FileAccessConfigBuilder {
    /// Application name used to namespace the default desktop directories.
    ///
    /// Ignored when a [`PlatformDirectories`] bridge is injected.
    ///
    /// Default: `"file-access"`
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the HTTP client used by `fetch`.
    ///
    /// An injected client is used as-is; `connect_timeout` and `user_agent`
    /// only shape the desktop default. `request_timeout` is also sent with
    /// every request, so it applies to injected clients too.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn directories(mut self, directories: Arc<dyn PlatformDirectories>) -> Self {
        self.directories = Some(directories);
        self
    }

    pub fn asset_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.asset_source = Some(source);
        self
    }

    pub fn storage_grant(mut self, grant: Arc<dyn StorageGrant>) -> Self {
        self.storage_grant = Some(grant);
        self
    }

    pub fn volume_info(mut self, info: Arc<dyn VolumeInfo>) -> Self {
        self.volume_info = Some(info);
        self
    }

    /// Default: 64 KiB
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Default: none
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Fills in defaults, then validates.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for out-of-range tunables
    /// - [`Error::CapabilityMissing`] for a missing bridge when no default
    ///   is available
    /// - [`Error::BridgeInit`] when a default bridge fails to initialize
    pub fn build(self) -> Result<FileAccessConfig> {
        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let app_name = self
            .app_name
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let directories = match self.directories {
            Some(directories) => directories,
            None => defaults::directories(&app_name)?,
        };

        let asset_source = match self.asset_source {
            Some(source) => source,
            None => defaults::asset_source(directories.as_ref())?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => defaults::http_client(connect_timeout, self.request_timeout, &user_agent)?,
        };

        let storage_grant = match self.storage_grant {
            Some(grant) => grant,
            None => defaults::storage_grant()?,
        };

        let volume_info = match self.volume_info {
            Some(info) => info,
            None => defaults::volume_info()?,
        };

        let config = FileAccessConfig {
            http_client,
            directories,
            asset_source,
            storage_grant,
            volume_info,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            request_timeout: self.request_timeout,
            connect_timeout,
            user_agent,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{
        BundleAssetSource, DesktopDirectories, DesktopStorageGrant, ReqwestHttpClient,
        SysinfoVolumes,
    };

    pub(super) fn directories(app_name: &str) -> Result<Arc<dyn PlatformDirectories>> {
        Ok(Arc::new(DesktopDirectories::new(app_name)))
    }

    pub(super) fn asset_source(
        directories: &dyn PlatformDirectories,
    ) -> Result<Arc<dyn AssetSource>> {
        let bundle = directories
            .main_bundle_dir()
            .map_err(|source| Error::BridgeInit {
                bridge: "AssetSource",
                source,
            })?;
        Ok(Arc::new(BundleAssetSource::new(bundle)))
    }

    pub(super) fn http_client(
        connect_timeout: Duration,
        request_timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Arc<dyn HttpClient>> {
        let client = ReqwestHttpClient::with_config(connect_timeout, request_timeout, user_agent)
            .map_err(|source| Error::BridgeInit {
                bridge: "HttpClient",
                source,
            })?;
        Ok(Arc::new(client))
    }

    pub(super) fn storage_grant() -> Result<Arc<dyn StorageGrant>> {
        Ok(Arc::new(DesktopStorageGrant::new()))
    }

    pub(super) fn volume_info() -> Result<Arc<dyn VolumeInfo>> {
        Ok(Arc::new(SysinfoVolumes::new()))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

    fn missing(capability: &'static str, purpose: &str) -> Error {
        Error::CapabilityMissing {
            capability,
            message: format!(
                "{} implementation is required for {}. \
                 Desktop: enable the 'desktop-shims' feature to use the default. \
                 Mobile and web hosts: inject a platform implementation through the builder.",
                capability, purpose
            ),
        }
    }

    pub(super) fn directories(_app_name: &str) -> Result<Arc<dyn PlatformDirectories>> {
        Err(missing("PlatformDirectories", "resolving directory roots"))
    }

    pub(super) fn asset_source(
        _directories: &dyn PlatformDirectories,
    ) -> Result<Arc<dyn AssetSource>> {
        Err(missing("AssetSource", "copying bundled assets"))
    }

    pub(super) fn http_client(
        _connect_timeout: Duration,
        _request_timeout: Option<Duration>,
        _user_agent: &str,
    ) -> Result<Arc<dyn HttpClient>> {
        Err(missing("HttpClient", "network fetches"))
    }

    pub(super) fn storage_grant() -> Result<Arc<dyn StorageGrant>> {
        Err(missing("StorageGrant", "shared storage writes"))
    }

    pub(super) fn volume_info() -> Result<Arc<dyn VolumeInfo>> {
        Err(missing("VolumeInfo", "disk space reporting"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{ExternalDir, HttpRequest, StreamingResponse, VolumeStats};
    use std::path::PathBuf;

    struct StubHttp;

    #[async_trait]
    impl HttpClient for StubHttp {
        async fn send(&self, _request: HttpRequest) -> BridgeResult<StreamingResponse> {
            Err(bridge_traits::BridgeError::Network("offline".to_string()))
        }
    }

    struct StubDirs;

    impl PlatformDirectories for StubDirs {
        fn cache_dir(&self) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/stub/cache"))
        }
        fn document_dir(&self) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/stub/docs"))
        }
        fn main_bundle_dir(&self) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/stub/bundle"))
        }
        fn external_dir(&self, dir: ExternalDir) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/stub/external").join(dir.as_str()))
        }
    }

    struct StubAssets;

    #[async_trait]
    impl AssetSource for StubAssets {
        async fn open_asset(
            &self,
            _name: &str,
        ) -> BridgeResult<Option<Box<dyn core_async::io::AsyncRead + Send + Unpin>>> {
            Ok(None)
        }
    }

    struct StubGrant;

    #[async_trait]
    impl StorageGrant for StubGrant {
        async fn is_granted(&self, _dir: ExternalDir) -> BridgeResult<bool> {
            Ok(true)
        }
    }

    struct StubVolumes;

    impl VolumeInfo for StubVolumes {
        fn volumes(&self) -> BridgeResult<Vec<VolumeStats>> {
            Ok(Vec::new())
        }
    }

    fn stubbed() -> FileAccessConfigBuilder {
        FileAccessConfig::builder()
            .http_client(Arc::new(StubHttp))
            .directories(Arc::new(StubDirs))
            .asset_source(Arc::new(StubAssets))
            .storage_grant(Arc::new(StubGrant))
            .volume_info(Arc::new(StubVolumes))
    }

    #[test]
    fn test_defaults_with_all_bridges() {
        let config = stubbed().build().unwrap();

        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(
            config.directories.cache_dir().unwrap(),
            PathBuf::from("/stub/cache")
        );
    }

    #[test]
    fn test_custom_tunables() {
        let config = stubbed()
            .chunk_size(MIN_CHUNK_SIZE)
            .request_timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(3))
            .user_agent("notes/2.0")
            .build()
            .unwrap();

        assert_eq!(config.chunk_size, MIN_CHUNK_SIZE);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "notes/2.0");
    }

    #[test]
    fn test_rejects_chunk_size_out_of_range() {
        for size in [0, MIN_CHUNK_SIZE - 1, MAX_CHUNK_SIZE + 1] {
            let err = stubbed().chunk_size(size).build().unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert!(err.to_string().contains("Chunk size"));
        }
        assert!(stubbed().chunk_size(MAX_CHUNK_SIZE).build().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let err = stubbed()
            .connect_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Connect timeout"));

        let err = stubbed()
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Request timeout"));
    }

    #[test]
    fn test_rejects_blank_user_agent() {
        let err = stubbed().user_agent("  ").build().unwrap_err();
        assert!(err.to_string().contains("User agent"));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = stubbed().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains("chunk_size"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_bridge_is_reported() {
        let err = FileAccessConfig::builder()
            .directories(Arc::new(StubDirs))
            .asset_source(Arc::new(StubAssets))
            .storage_grant(Arc::new(StubGrant))
            .volume_info(Arc::new(StubVolumes))
            .build()
            .unwrap_err();

        match err {
            Error::CapabilityMissing { capability, message } => {
                assert_eq!(capability, "HttpClient");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_defaults_fill_missing_bridges() {
        let config = FileAccessConfig::builder()
            .app_name("core-runtime-test")
            .build()
            .unwrap();

        assert!(config
            .directories
            .cache_dir()
            .unwrap()
            .ends_with("core-runtime-test"));
    }
}
