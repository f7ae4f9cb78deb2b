//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `PlatformDirectories` using the `dirs` crate
//! - `AssetSource` reading assets from a directory next to the executable
//! - `StorageGrant` granting shared folders unless revoked
//! - `VolumeInfo` using `sysinfo`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopDirectories, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let directories = Arc::new(DesktopDirectories::new("my-app"));
//! ```

mod assets;
mod directories;
mod grant;
mod http;
mod volumes;

pub use assets::BundleAssetSource;
pub use directories::DesktopDirectories;
pub use grant::DesktopStorageGrant;
pub use http::{ReqwestHttpClient, DEFAULT_USER_AGENT};
pub use volumes::SysinfoVolumes;
