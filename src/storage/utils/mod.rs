// Utilities for storage module
pub mod error;
