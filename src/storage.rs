use crate::error::Result;
use crate::wrap_err;
use bytes::Bytes;
use std::fmt;
use std::ops::Add;

pub mod backend;
pub mod constants;
pub mod operations;
pub mod pipe;
mod utils;

use self::operations::compress::{Compressor, GzipCompressor, GzipReader};
use self::operations::merge::{Merger, StreamMerger};
use self::operations::mv::{Mover, StoreMover};
use self::operations::read_all::{ChunkedReader, Reader};
use self::pipe::StreamWriter;

/// Opaque identifier of a storage object.
///
/// Semantically a backend-qualified key or path string. The derived layer
/// never inspects its contents; it only hands it down to the primitive
/// interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IoPath(String);

impl IoPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IoPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for IoPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for IoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object length as reported by a size query or advertised to a streaming
/// write.
///
/// Composing lengths with `+` yields `Known(sum)` only when every part is
/// `Known`; a single `Unknown` makes the whole composition `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredLength {
    Known(u64),
    Unknown,
}

impl DeclaredLength {
    pub fn known(self) -> Option<u64> {
        match self {
            DeclaredLength::Known(n) => Some(n),
            DeclaredLength::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, DeclaredLength::Unknown)
    }
}

impl Add for DeclaredLength {
    type Output = DeclaredLength;

    fn add(self, rhs: DeclaredLength) -> DeclaredLength {
        match (self, rhs) {
            (DeclaredLength::Known(a), DeclaredLength::Known(b)) => DeclaredLength::Known(a + b),
            _ => DeclaredLength::Unknown,
        }
    }
}

/// Single-pass, forward-only read handle onto one storage object.
pub type ByteStream = Box<dyn futures::AsyncRead + Send + Unpin>;

/// The minimal primitive interface the derived layer is built on.
///
/// Implemented per backend; [`backend::OpenDalStore`] bridges any
/// [`opendal::Operator`]. The derived operations call these methods only and
/// keep no state between calls.
pub trait StorageIo: Send + Sync {
    /// Open a read stream over the whole object.
    async fn read(&self, path: &IoPath) -> Result<ByteStream>;

    /// Open a read stream starting at `offset` bytes into the object.
    async fn read_from(&self, path: &IoPath, offset: u64) -> Result<ByteStream>;

    /// Point write of a fully materialized payload.
    async fn write(&self, path: &IoPath, payload: Bytes) -> Result<()>;

    /// Open a streaming write advertising `declared` as the eventual length.
    ///
    /// Returns as soon as the pipe is set up. The implementation must drain
    /// the consuming half on a separate task; otherwise the producer blocks
    /// forever once the pipe's buffer fills.
    async fn write_stream(&self, path: &IoPath, declared: DeclaredLength) -> Result<StreamWriter>;

    /// Object length, or `Unknown` when the backend cannot tell up front.
    async fn size(&self, path: &IoPath) -> Result<DeclaredLength>;

    /// Server-side copy of one object to another path.
    async fn copy(&self, from: &IoPath, to: &IoPath) -> Result<()>;

    /// Remove one object.
    async fn remove(&self, path: &IoPath) -> Result<()>;
}

/// Facade over the derived operations for one storage backend.
#[derive(Clone)]
pub struct StorageClient<S> {
    store: S,
}

impl<S: StorageIo + Clone> StorageClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gzip-compress `payload` in memory and point-write it to `path`.
    pub async fn write_gzip(&self, path: &IoPath, payload: &[u8]) -> Result<()> {
        log::debug!("write_gzip path={} payload_len={}", path, payload.len());
        let compressor = GzipCompressor::new(self.store.clone());
        wrap_err!(
            compressor.write_gzip(path, payload).await,
            WriteGzipFailed {
                path: path.to_string()
            }
        )
    }

    /// Read the whole object at `path` and return a lazily-decoding gzip
    /// view over it. Malformed payloads fail on first read from the view,
    /// not here.
    pub async fn read_gzip(&self, path: &IoPath) -> Result<GzipReader> {
        log::debug!("read_gzip path={}", path);
        let compressor = GzipCompressor::new(self.store.clone());
        wrap_err!(
            compressor.read_gzip(path).await,
            ReadGzipFailed {
                path: path.to_string()
            }
        )
    }

    /// Read the whole object into memory.
    pub async fn read_all(&self, path: &IoPath) -> Result<Vec<u8>> {
        log::debug!("read_all path={}", path);
        let reader = ChunkedReader::new(self.store.clone());
        wrap_err!(
            reader.read_all(path).await,
            ReadAllFailed {
                path: path.to_string()
            }
        )
    }

    /// Read from `offset` to the end of the object.
    pub async fn read_all_from(&self, path: &IoPath, offset: u64) -> Result<Vec<u8>> {
        log::debug!("read_all_from path={} offset={}", path, offset);
        let reader = ChunkedReader::new(self.store.clone());
        wrap_err!(
            reader.read_all_from(path, offset).await,
            ReadAllFailed {
                path: path.to_string()
            }
        )
    }

    /// Read exactly `len` bytes starting at `offset`; `len == 0` drains to
    /// the end of the object instead (see [`operations::read_all`]).
    pub async fn read_all_range(&self, path: &IoPath, offset: u64, len: u64) -> Result<Vec<u8>> {
        log::debug!("read_all_range path={} offset={} len={}", path, offset, len);
        let reader = ChunkedReader::new(self.store.clone());
        wrap_err!(
            reader.read_all_range(path, offset, len).await,
            ReadAllFailed {
                path: path.to_string()
            }
        )
    }

    /// Concatenate `src_a` then `src_b` into `dest`, suppressing per-source
    /// copy failures. See [`operations::merge`] for the policy asymmetry
    /// against [`StorageClient::merge_from`].
    pub async fn merge(&self, src_a: &IoPath, src_b: &IoPath, dest: &IoPath) -> Result<()> {
        log::debug!("merge src_a={} src_b={} dest={}", src_a, src_b, dest);
        let merger = StreamMerger::new(self.store.clone());
        wrap_err!(
            merger.merge(src_a, src_b, dest).await,
            MergeFailed {
                dest: dest.to_string()
            }
        )
    }

    /// Concatenate `sources` in order into `dest`, aborting on the first
    /// failure.
    pub async fn merge_from(&self, dest: &IoPath, sources: &[IoPath]) -> Result<()> {
        log::debug!("merge_from dest={} sources_count={}", dest, sources.len());
        let merger = StreamMerger::new(self.store.clone());
        wrap_err!(
            merger.merge_from(dest, sources).await,
            MergeFailed {
                dest: dest.to_string()
            }
        )
    }

    /// Move `from` to `to` as copy-then-remove. Not atomic: see
    /// [`operations::mv`].
    pub async fn mv(&self, from: &IoPath, to: &IoPath) -> Result<()> {
        log::debug!("mv from={} to={}", from, to);
        let mover = StoreMover::new(self.store.clone());
        wrap_err!(
            mover.mv(from, to).await,
            MoveFailed {
                from: from.to_string(),
                to: to.to_string()
            }
        )
    }
}
