//! `StorageIo` bridge over an [`opendal::Operator`].

use crate::error::{Error, Result};
use crate::storage::constants::DEFAULT_PIPE_CAPACITY;
use crate::storage::pipe::{PipeChunk, StreamWriter};
use crate::storage::{ByteStream, DeclaredLength, IoPath, StorageIo};
use bytes::Bytes;
use opendal::Operator;
use tokio::sync::mpsc;

/// Primitive storage operations backed by any configured OpenDAL service.
///
/// This is bridging glue only: the caller builds and configures the
/// [`Operator`]; no provider or credential handling lives here.
#[derive(Clone)]
pub struct OpenDalStore {
    operator: Operator,
    pipe_capacity: usize,
}

impl OpenDalStore {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }

    /// Override the merge-pipe depth (in chunks). Mostly useful to make
    /// backpressure observable in tests.
    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity.max(1);
        self
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn map_not_found(path: &IoPath, error: opendal::Error) -> Error {
        if error.kind() == opendal::ErrorKind::NotFound {
            Error::PathNotFound {
                path: path.to_string(),
            }
        } else {
            error.into()
        }
    }
}

impl StorageIo for OpenDalStore {
    async fn read(&self, path: &IoPath) -> Result<ByteStream> {
        self.read_from(path, 0).await
    }

    async fn read_from(&self, path: &IoPath, offset: u64) -> Result<ByteStream> {
        let meta = self
            .operator
            .stat(path.as_str())
            .await
            .map_err(|e| Self::map_not_found(path, e))?;
        let len = meta.content_length();
        if offset >= len {
            // Zero-length objects and past-the-end offsets degrade to an
            // immediately exhausted stream.
            return Ok(Box::new(futures::io::empty()));
        }
        let reader = self
            .operator
            .reader(path.as_str())
            .await
            .map_err(|e| Self::map_not_found(path, e))?;
        let stream = reader.into_futures_async_read(offset..len).await?;
        Ok(Box::new(stream))
    }

    async fn write(&self, path: &IoPath, payload: Bytes) -> Result<()> {
        self.operator.write(path.as_str(), payload).await?;
        Ok(())
    }

    async fn write_stream(&self, path: &IoPath, _declared: DeclaredLength) -> Result<StreamWriter> {
        // OpenDAL writers negotiate upload sizing themselves; the declared
        // length stays in the trait for backends that need it up front.
        let mut writer = self.operator.writer(path.as_str()).await?;
        let (tx, mut rx) = mpsc::channel::<PipeChunk>(self.pipe_capacity);

        let drain = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Some(PipeChunk::Data(chunk)) => {
                        if let Err(e) = writer.write(chunk).await {
                            let _ = writer.abort().await;
                            return Err(Error::from(e));
                        }
                    }
                    Some(PipeChunk::Eof) => {
                        writer.close().await?;
                        return Ok(());
                    }
                    None => {
                        // Producer dropped the pipe without Eof: discard the
                        // partial object rather than committing it.
                        let _ = writer.abort().await;
                        return Err(Error::PipeClosed);
                    }
                }
            }
        });

        Ok(StreamWriter::new(tx, drain))
    }

    async fn size(&self, path: &IoPath) -> Result<DeclaredLength> {
        let meta = self
            .operator
            .stat(path.as_str())
            .await
            .map_err(|e| Self::map_not_found(path, e))?;
        Ok(DeclaredLength::Known(meta.content_length()))
    }

    async fn copy(&self, from: &IoPath, to: &IoPath) -> Result<()> {
        match self.operator.copy(from.as_str(), to.as_str()).await {
            Ok(()) => Ok(()),
            // Not every service offers server-side copy; fall back to a
            // read-then-write through this process.
            Err(e) if e.kind() == opendal::ErrorKind::Unsupported => {
                let data = self
                    .operator
                    .read(from.as_str())
                    .await
                    .map_err(|e| Self::map_not_found(from, e))?;
                self.operator.write(to.as_str(), data).await?;
                Ok(())
            }
            Err(e) => Err(Self::map_not_found(from, e)),
        }
    }

    async fn remove(&self, path: &IoPath) -> Result<()> {
        self.operator.delete(path.as_str()).await?;
        Ok(())
    }
}
