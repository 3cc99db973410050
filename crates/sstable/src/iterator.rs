use crate::format::read_footer;
use crate::SSTableError;
use memtable::{decode_record, encoded_len, Record, RecordKind};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

/// An ordered, forward-only iterator over an SSTable's data region.
///
/// Used by compaction to drive a k-way merge without materializing an
/// entire file in memory. The iterator is primed to its first record on
/// open and exposes `current_*`/`advance` rather than implementing
/// `std::iter::Iterator`, matching the shape the merge needs (peek before
/// consuming, across many sources at once).
pub struct SSTableIterator {
    reader: BufReader<File>,
    /// Byte offset where the data region ends (the filter offset).
    filter_offset: u64,
    /// Byte offset the reader has consumed up to.
    pos: u64,
    current: Option<Record>,
}

impl SSTableIterator {
    /// Opens `path` and decodes its first record, if any.
    pub fn open(path: &Path) -> Result<Self, SSTableError> {
        let mut file = File::open(path)?;
        let filter_offset = read_footer(&mut file)?;
        file.seek(SeekFrom::Start(0))?;

        let mut iter = Self {
            reader: BufReader::new(file),
            filter_offset,
            pos: 0,
            current: None,
        };
        iter.advance()?;
        Ok(iter)
    }

    /// The current record's key, or `None` if the iterator is exhausted.
    pub fn current_key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|r| r.key.as_slice())
    }

    /// The current record's value, or `None` if the iterator is exhausted.
    pub fn current_value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|r| r.value.as_slice())
    }

    /// The current record's kind, or `None` if the iterator is exhausted.
    pub fn current_kind(&self) -> Option<RecordKind> {
        self.current.as_ref().map(|r| r.kind)
    }

    /// Returns `true` once the data region has been fully consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Decodes the next record, stopping at the filter offset. Once the
    /// cursor reaches `filter_offset` the iterator becomes exhausted and
    /// further calls are no-ops.
    pub fn advance(&mut self) -> Result<(), SSTableError> {
        if self.pos >= self.filter_offset {
            self.current = None;
            return Ok(());
        }
        self.current = match decode_record(&mut self.reader)? {
            Some(record) => {
                self.pos += encoded_len(&record);
                Some(record)
            }
            None => None,
        };
        Ok(())
    }

    /// Explicitly releases the underlying file handle.
    pub fn close(self) {}
}
