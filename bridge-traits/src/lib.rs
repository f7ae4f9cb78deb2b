//! # Host Bridge Traits
//!
//! Platform abstraction traits consumed by the file access engine.
//!
//! ## Overview
//!
//! The engine performs file I/O, hashing and network-to-disk transfers
//! itself. A handful of capabilities, however, only the host platform can
//! answer: where the logical roots live, how to read bundled assets, whether
//! shared storage is writable, how full the disks are, and how to speak HTTP
//! on that platform. Each of those is a trait here.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Streaming HTTP requests
//!
//! ### Storage
//! - [`PlatformDirectories`](storage::PlatformDirectories) - Logical roots and shared directories
//! - [`AssetSource`](storage::AssetSource) - Read access to bundled assets
//! - [`StorageGrant`](storage::StorageGrant) - Shared-storage permission check
//! - [`VolumeInfo`](storage::VolumeInfo) - Free/total space per volume
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should report transport failures as `Network`, refused grants as
//! `PermissionDenied`, and missing platform features as `NotAvailable`, so
//! the engine can map them onto its own error taxonomy.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`; the engine shares them across
//! tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod logging;
pub mod storage;

pub use error::BridgeError;

pub use http::{ByteStream, HttpClient, HttpMethod, HttpRequest, StreamingResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use storage::{
    AssetSource, ExternalDir, PlatformDirectories, StorageGrant, VolumeInfo, VolumeStats,
};
