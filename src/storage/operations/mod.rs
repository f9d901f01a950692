// Derived operation traits and their implementations over `StorageIo`
pub mod compress;
pub mod merge;
pub mod mv;
pub mod read_all;

pub use compress::{Compressor, GzipCompressor, GzipReader};
pub use merge::{Merger, StreamMerger};
pub use mv::{Mover, StoreMover};
pub use read_all::{ChunkedReader, Reader};
