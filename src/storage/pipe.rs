//! Bounded producer/consumer pipe behind a streaming write.
//!
//! A [`StreamWriter`] is the producer half handed out by
//! [`StorageIo::write_stream`](crate::storage::StorageIo::write_stream). The
//! backend drains the receiving half of the channel on its own task and
//! commits or discards the object depending on how the pipe ends: an
//! explicit [`PipeChunk::Eof`] commits, a channel that closes without `Eof`
//! means the producer gave up and the partial object must be discarded.
//!
//! The channel is bounded; [`StreamWriter::write`] blocks once the buffer is
//! full until the backend catches up. A backend that never drains therefore
//! deadlocks the producer, which is why `write_stream` implementations must
//! consume on a separate task.

use crate::error::{Error, Result};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One message on the pipe.
pub enum PipeChunk {
    Data(Bytes),
    /// End-of-object marker. Tells the drain task to commit.
    Eof,
}

/// Producer half of a streaming write.
///
/// Must be closed via [`StreamWriter::close`] on the success path; dropping
/// it instead signals abort to the backend.
pub struct StreamWriter {
    tx: Option<mpsc::Sender<PipeChunk>>,
    drain: Option<JoinHandle<Result<()>>>,
}

impl StreamWriter {
    /// Pair a sending half with the backend's drain task.
    pub fn new(tx: mpsc::Sender<PipeChunk>, drain: JoinHandle<Result<()>>) -> Self {
        Self {
            tx: Some(tx),
            drain: Some(drain),
        }
    }

    /// Push one chunk, blocking while the pipe buffer is full.
    ///
    /// If the drain task already went away, its failure is joined and
    /// surfaced here instead of a bare channel error.
    pub async fn write(&mut self, chunk: Bytes) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::PipeClosed)?;
        if tx.send(PipeChunk::Data(chunk)).await.is_ok() {
            return Ok(());
        }
        self.tx = None;
        self.join().await?;
        Err(Error::PipeClosed)
    }

    /// Signal end-of-object and wait for the backend to commit.
    pub async fn close(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            // A failed send means the drain task already stopped; its error
            // comes out of the join below.
            let _ = tx.send(PipeChunk::Eof).await;
        }
        self.join().await
    }

    async fn join(&mut self) -> Result<()> {
        match self.drain.take() {
            Some(handle) => handle.await.map_err(|_| Error::PipeClosed)?,
            None => Err(Error::PipeClosed),
        }
    }
}
