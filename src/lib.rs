//! Derived byte-I/O operations over pluggable storage primitives.
//!
//! `bytelayer` builds gzip compression, bounded and whole-object reads,
//! multi-source streaming merge, and move semantics purely out of a minimal
//! primitive interface ([`storage::StorageIo`]): point read, point write,
//! streaming write, size query, copy, and remove. Backends plug in beneath
//! the trait; [`storage::backend::OpenDalStore`] bridges any
//! [`opendal::Operator`].
//!
//! The merge operations stream multiple sources into one destination through
//! a bounded producer/consumer pipe without materializing the concatenation
//! in memory; see [`storage::pipe`].

pub mod error;
pub mod storage;
