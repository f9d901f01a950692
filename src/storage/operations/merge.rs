use crate::error::Result;
use crate::storage::constants::MERGE_CHUNK_SIZE;
use crate::storage::pipe::StreamWriter;
use crate::storage::{DeclaredLength, IoPath, StorageIo};
use bytes::Bytes;
use futures::AsyncReadExt;

/// Trait for concatenating several source objects into one destination.
///
/// Both operations stream through a bounded producer/consumer pipe, so the
/// full concatenation never has to exist in memory. Source bytes land in the
/// destination strictly in the given order, each source fully before the
/// next begins.
///
/// The two forms deliberately differ in failure policy, inherited contract:
/// [`Merger::merge`] suppresses a failing source and carries on, while
/// [`Merger::merge_from`] aborts on the first failure. Callers of `merge`
/// cannot distinguish "source was empty" from "source read failed".
pub trait Merger {
    /// Concatenate `src_a` then `src_b` into `dest`.
    ///
    /// A copy failure on either source is logged and suppressed; the
    /// remaining bytes of that source are simply omitted from the output.
    /// Size-query failures still propagate.
    async fn merge(&self, src_a: &IoPath, src_b: &IoPath, dest: &IoPath) -> Result<()>;

    /// Concatenate `sources` in order into `dest`.
    ///
    /// Unlike [`Merger::merge`], the first read or write failure aborts the
    /// whole operation and no destination object is committed. An empty
    /// source list commits a zero-length destination.
    async fn merge_from(&self, dest: &IoPath, sources: &[IoPath]) -> Result<()>;
}

/// Streaming merge implementation over any `StorageIo` backend.
pub struct StreamMerger<S> {
    store: S,
}

impl<S: StorageIo> StreamMerger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Copy one source into the pipe in fixed-size chunks until exhausted.
    async fn copy_source(&self, source: &IoPath, writer: &mut StreamWriter) -> Result<()> {
        let mut stream = self.store.read(source).await?;
        let mut chunk = [0u8; MERGE_CHUNK_SIZE];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            writer.write(Bytes::copy_from_slice(&chunk[..n])).await?;
        }
    }

    /// Lenient variant for the two-source form: any failure while copying
    /// this source is swallowed after a warning.
    async fn copy_source_lenient(&self, source: &IoPath, writer: &mut StreamWriter) {
        if let Err(e) = self.copy_source(source, writer).await {
            log::warn!("merge: suppressed failure copying source {}: {}", source, e);
        }
    }

    /// Sum source sizes into the length advertised to the destination
    /// write. One `Unknown` makes the whole composition `Unknown`; no
    /// further sources are queried past that point.
    async fn declared_length(&self, sources: &[&IoPath]) -> Result<DeclaredLength> {
        let mut declared = DeclaredLength::Known(0);
        for source in sources {
            match self.store.size(source).await? {
                DeclaredLength::Unknown => return Ok(DeclaredLength::Unknown),
                known => declared = declared + known,
            }
        }
        Ok(declared)
    }
}

impl<S: StorageIo> Merger for StreamMerger<S> {
    async fn merge(&self, src_a: &IoPath, src_b: &IoPath, dest: &IoPath) -> Result<()> {
        let declared = self.declared_length(&[src_a, src_b]).await?;
        let mut writer = self.store.write_stream(dest, declared).await?;
        self.copy_source_lenient(src_a, &mut writer).await;
        self.copy_source_lenient(src_b, &mut writer).await;
        writer.close().await
    }

    async fn merge_from(&self, dest: &IoPath, sources: &[IoPath]) -> Result<()> {
        let refs: Vec<&IoPath> = sources.iter().collect();
        let declared = self.declared_length(&refs).await?;
        let mut writer = self.store.write_stream(dest, declared).await?;
        for source in sources {
            // Dropping the writer on the error path closes the pipe without
            // Eof, which tells the backend to discard the partial object.
            self.copy_source(source, &mut writer).await?;
        }
        writer.close().await
    }
}
