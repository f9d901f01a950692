use crate::error::Result;
use crate::storage::operations::read_all::{ChunkedReader, Reader};
use crate::storage::{IoPath, StorageIo};
use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Cursor, Write};

/// Lazily-decoding view over a gzip object read into memory.
///
/// Implements [`std::io::Read`]; a malformed container surfaces as a read
/// error on first access, not when the view is created.
pub type GzipReader = GzDecoder<Cursor<Vec<u8>>>;

/// Trait for storing and retrieving gzip-framed objects.
pub trait Compressor {
    /// Compress `payload` in memory and point-write the result to `path`.
    async fn write_gzip(&self, path: &IoPath, payload: &[u8]) -> Result<()>;

    /// Read the whole object at `path` and return a decompressing view over
    /// it.
    async fn read_gzip(&self, path: &IoPath) -> Result<GzipReader>;
}

/// Gzip implementation over any `StorageIo` backend.
///
/// The container is standard RFC 1952 gzip framing, readable by any
/// independently written gzip decoder.
pub struct GzipCompressor<S> {
    store: S,
}

impl<S: StorageIo + Clone> GzipCompressor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: StorageIo + Clone> Compressor for GzipCompressor<S> {
    async fn write_gzip(&self, path: &IoPath, payload: &[u8]) -> Result<()> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload)?;
        let compressed = encoder.finish()?;
        self.store.write(path, Bytes::from(compressed)).await
    }

    async fn read_gzip(&self, path: &IoPath) -> Result<GzipReader> {
        let payload = ChunkedReader::new(self.store.clone()).read_all(path).await?;
        Ok(GzDecoder::new(Cursor::new(payload)))
    }
}
