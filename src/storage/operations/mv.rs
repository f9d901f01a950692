use crate::error::Result;
use crate::storage::{IoPath, StorageIo};

/// Trait for relocating one object.
pub trait Mover {
    /// Move `from` to `to` as primitive copy followed by primitive remove.
    ///
    /// Not atomic — no backend is assumed to offer a native rename. If the
    /// process is interrupted after the copy, both objects exist; if the
    /// copy fails, the remove is not attempted. Callers must tolerate the
    /// copied-but-not-removed partial-failure mode.
    async fn mv(&self, from: &IoPath, to: &IoPath) -> Result<()>;
}

/// Copy-then-remove implementation over any `StorageIo` backend.
pub struct StoreMover<S> {
    store: S,
}

impl<S: StorageIo> StoreMover<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: StorageIo> Mover for StoreMover<S> {
    async fn mv(&self, from: &IoPath, to: &IoPath) -> Result<()> {
        self.store.copy(from, to).await?;
        self.store.remove(from).await
    }
}
