//! # SSTable - Sorted String Table
//!
//! Immutable, on-disk storage files for the RiptideKV storage engine.
//!
//! When the in-memory [`memtable::Memtable`] reaches its flush threshold the
//! engine writes it to disk as an SSTable. SSTables are *write-once,
//! read-many* -- once created they are never modified, only superseded by a
//! later compaction.
//!
//! ## File layout
//!
//! ```text
//! +----------------------+
//! | data region          |   sequence of encoded records, sorted, unique keys
//! |  [kind u8]           |
//! |  [key_len i32 LE]    |
//! |  [val_len i32 LE]    |
//! |  [key bytes]         |
//! |  [val bytes]         |
//! |  ... repeated ...    |
//! +----------------------+  <-- offset F
//! | filter bitset        |   bloom_bytes bytes
//! +----------------------+
//! | footer: F (i64 LE)   |   8 bytes
//! +----------------------+
//! ```
//!
//! There is no in-file index and no checksum: the bloom filter is the sole
//! acceleration for a point lookup miss, and a miss against the filter skips
//! the data region scan entirely. A hit falls through to a linear scan.

mod format;
mod iterator;
mod merge;
mod reader;
mod writer;

pub use format::FOOTER_BYTES;
pub use iterator::SSTableIterator;
pub use merge::MergeIterator;
pub use reader::{search_file, SSTableReader};
pub use writer::SSTableWriter;

use thiserror::Error;

/// Errors that can occur while reading or writing an SSTable file.
#[derive(Debug, Error)]
pub enum SSTableError {
    /// An underlying I/O error (open, read, write, seek, rename, remove).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The writer was given zero records; an SSTable may not be empty.
    #[error("refusing to write an empty SSTable")]
    Empty,
}

impl SSTableError {
    /// Returns `true` if this is the "zero records" case, which callers
    /// (compaction in particular) treat as "produce no output file" rather
    /// than a hard failure.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, SSTableError::Empty)
    }
}

#[cfg(test)]
mod tests;
