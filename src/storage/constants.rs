// Buffer related constants
pub const READ_CHUNK_SIZE: usize = 16 * 1024;
pub const MERGE_CHUNK_SIZE: usize = 4 * 1024;

// How many chunks the merge pipe buffers before the producer blocks
pub const DEFAULT_PIPE_CAPACITY: usize = 16;
