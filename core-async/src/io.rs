//! Async I/O traits and utilities.
//!
//! Re-exports Tokio's I/O traits together with the `tokio-util` bridges that
//! turn byte streams into readers, which is how HTTP bodies reach the disk.

pub use tokio::io::{
    copy, empty, AsyncBufRead, AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite,
    AsyncWriteExt, BufReader, BufWriter, ReadBuf,
};

pub use tokio_util::io::{ReaderStream, StreamReader};
