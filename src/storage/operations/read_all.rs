use crate::error::{Result, ShortReadSnafu};
use crate::storage::constants::READ_CHUNK_SIZE;
use crate::storage::{ByteStream, IoPath, StorageIo};
use futures::AsyncReadExt;

/// Trait for draining storage objects into memory, whole or bounded.
pub trait Reader {
    /// Read the entire object.
    async fn read_all(&self, path: &IoPath) -> Result<Vec<u8>>;

    /// Read from `offset` to the end of the object.
    async fn read_all_from(&self, path: &IoPath, offset: u64) -> Result<Vec<u8>>;

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// `len == 0` means "no bound" and drains to the end instead; callers
    /// reach whole-object reads through the same code path this way. A
    /// stream that ends before `len` bytes fails with
    /// [`Error::ShortRead`](crate::error::Error::ShortRead).
    async fn read_all_range(&self, path: &IoPath, offset: u64, len: u64) -> Result<Vec<u8>>;
}

/// Upper bound for one drain loop.
enum ReadLimit {
    Bounded(u64),
    Unbounded,
}

impl ReadLimit {
    /// Zero maps to `Unbounded`, preserving the "no bound" contract of the
    /// original non-positive sentinel.
    fn from_len(len: u64) -> Self {
        if len == 0 {
            ReadLimit::Unbounded
        } else {
            ReadLimit::Bounded(len)
        }
    }
}

/// Chunked drain implementation over any `StorageIo` backend.
pub struct ChunkedReader<S> {
    store: S,
}

impl<S: StorageIo> ChunkedReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Drain `stream` in fixed-size chunks until end-of-stream or, when
    /// bounded, until at least the requested count accumulated. Draining is
    /// chunk-granular, so a bounded read can overshoot; the overshoot is
    /// truncated before returning.
    async fn drain(mut stream: ByteStream, limit: ReadLimit) -> Result<Vec<u8>> {
        let mut collected = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&chunk[..n]);
            if let ReadLimit::Bounded(len) = limit {
                if collected.len() as u64 >= len {
                    break;
                }
            }
        }

        match limit {
            ReadLimit::Unbounded => Ok(collected),
            ReadLimit::Bounded(len) => {
                snafu::ensure!(
                    collected.len() as u64 >= len,
                    ShortReadSnafu {
                        actual: collected.len(),
                        requested: len
                    }
                );
                collected.truncate(len as usize);
                Ok(collected)
            }
        }
    }
}

impl<S: StorageIo> Reader for ChunkedReader<S> {
    async fn read_all(&self, path: &IoPath) -> Result<Vec<u8>> {
        let stream = self.store.read(path).await?;
        Self::drain(stream, ReadLimit::Unbounded).await
    }

    async fn read_all_from(&self, path: &IoPath, offset: u64) -> Result<Vec<u8>> {
        let stream = self.store.read_from(path, offset).await?;
        Self::drain(stream, ReadLimit::Unbounded).await
    }

    async fn read_all_range(&self, path: &IoPath, offset: u64, len: u64) -> Result<Vec<u8>> {
        let stream = self.store.read_from(path, offset).await?;
        Self::drain(stream, ReadLimit::from_len(len)).await
    }
}
