//! # Memtable
//!
//! An in-memory, sorted, mutable write buffer for the storage engine, plus
//! the `Record` data model and binary codec shared with the write-ahead log
//! and the SSTable data region.
//!
//! The memtable is the first point of contact for every write operation. It
//! buffers recent `PUT` and `DELETE` operations in a sorted structure
//! (`BTreeMap`) before they are flushed to immutable on-disk SSTables.
//!
//! ## Key properties
//! - **Sorted order**: entries are always in ascending key order (required for SSTable flush).
//! - **Overwrite semantics**: re-inserting an existing key replaces its entry in place; size (distinct key count) is unchanged.
//! - **Tombstone support**: deletes are recorded as `Record { kind: RecordKind::Delete, value: vec![], .. }`.
//!
//! ## Example
//! ```rust
//! use memtable::{Memtable, RecordKind};
//!
//! let mut m = Memtable::new();
//! m.put(b"hello".to_vec(), b"world".to_vec(), RecordKind::Put);
//! assert_eq!(m.get(b"hello").unwrap().value, b"world".to_vec());
//!
//! m.put(b"hello".to_vec(), Vec::new(), RecordKind::Delete);
//! assert_eq!(m.get(b"hello").unwrap().kind, RecordKind::Delete);
//! ```

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

/// Wire value for [`RecordKind::Put`].
pub const KIND_PUT: u8 = 0;
/// Wire value for [`RecordKind::Delete`].
pub const KIND_DELETE: u8 = 1;

/// Whether a [`Record`] is a live value or a tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A key-value insertion.
    Put,
    /// A tombstone marking a key as logically deleted.
    Delete,
}

impl RecordKind {
    /// Returns the single-byte wire representation of this kind.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            RecordKind::Put => KIND_PUT,
            RecordKind::Delete => KIND_DELETE,
        }
    }

    /// Parses a single-byte wire representation, returning `None` for any
    /// value other than [`KIND_PUT`] or [`KIND_DELETE`].
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            KIND_PUT => Some(RecordKind::Put),
            KIND_DELETE => Some(RecordKind::Delete),
            _ => None,
        }
    }
}

/// A single write-unit: a key, its kind (`PUT` or `DELETE`), and its value.
///
/// A `DELETE` record (a tombstone) always carries an empty value. `Record` is
/// the shared currency of every write path: it is what gets appended to the
/// WAL, what the memtable stores, and what an SSTable's data region holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Whether this is a live value or a tombstone.
    pub kind: RecordKind,
    /// The lookup key.
    pub key: Vec<u8>,
    /// The payload. Always empty for `DELETE` records.
    pub value: Vec<u8>,
}

impl Record {
    /// Builds a `PUT` record.
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            kind: RecordKind::Put,
            key,
            value,
        }
    }

    /// Builds a `DELETE` record (tombstone) with an empty value.
    pub fn delete(key: Vec<u8>) -> Self {
        Self {
            kind: RecordKind::Delete,
            key,
            value: Vec::new(),
        }
    }

    /// Returns `true` if this record is a tombstone.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.kind == RecordKind::Delete
    }
}

/// Encodes `record` using the shared record layout:
///
/// ```text
/// [kind: u8][key_len: i32 LE][value_len: i32 LE][key bytes][value bytes]
/// ```
///
/// This layout is used identically by the WAL and by an SSTable's data
/// region, which is what lets both be decoded with [`decode_record`].
pub fn encode_record<W: Write>(w: &mut W, record: &Record) -> io::Result<()> {
    w.write_all(&[record.kind.as_byte()])?;
    w.write_all(&(record.key.len() as i32).to_le_bytes())?;
    w.write_all(&(record.value.len() as i32).to_le_bytes())?;
    w.write_all(&record.key)?;
    w.write_all(&record.value)?;
    Ok(())
}

/// Returns the number of bytes [`encode_record`] would write for `record`.
#[must_use]
pub fn encoded_len(record: &Record) -> u64 {
    (1 + 4 + 4 + record.key.len() + record.value.len()) as u64
}

/// Decodes a single record from `r`.
///
/// Returns `Ok(Some(record))` on a complete, well-formed record. Returns
/// `Ok(None)` if the stream ends (cleanly or mid-record) before a complete
/// record could be assembled, or if the stream declares an unrecognized
/// `kind` byte or a negative length — callers (WAL replay, SSTable scans)
/// treat all of these identically: stop here, keep whatever was already
/// decoded. Only a genuine I/O error is propagated as `Err`.
pub fn decode_record<R: Read>(r: &mut R) -> io::Result<Option<Record>> {
    let mut kind_byte = [0u8; 1];
    if read_exact_or_eof(r, &mut kind_byte)?.is_none() {
        return Ok(None);
    }
    let kind = match RecordKind::from_byte(kind_byte[0]) {
        Some(k) => k,
        None => return Ok(None),
    };

    let mut len_buf = [0u8; 8];
    if read_exact_or_eof(r, &mut len_buf)?.is_none() {
        return Ok(None);
    }
    let key_len = i32::from_le_bytes(len_buf[0..4].try_into().unwrap());
    let value_len = i32::from_le_bytes(len_buf[4..8].try_into().unwrap());
    if key_len < 0 || value_len < 0 {
        return Ok(None);
    }

    let mut key = vec![0u8; key_len as usize];
    if read_exact_or_eof(r, &mut key)?.is_none() {
        return Ok(None);
    }
    let mut value = vec![0u8; value_len as usize];
    if read_exact_or_eof(r, &mut value)?.is_none() {
        return Ok(None);
    }

    Ok(Some(Record { kind, key, value }))
}

/// Like `Read::read_exact`, but turns an EOF encountered before `buf` is
/// fully populated into `Ok(None)` instead of an error, while still
/// propagating any other I/O error.
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<Option<()>> {
    if buf.is_empty() {
        return Ok(Some(()));
    }
    match r.read_exact(buf) {
        Ok(()) => Ok(Some(())),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// An ordered, in-memory write buffer backed by a `BTreeMap`.
///
/// Size is the count of **distinct keys**, including tombstones — this is
/// what the engine compares against `MEMTABLE_LIMIT` to decide when to flush.
#[derive(Debug, Default)]
pub struct Memtable {
    map: BTreeMap<Vec<u8>, Record>,
}

impl Memtable {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// If `key` is already present its `(value, kind)` is overwritten in
    /// place and the distinct-key count is unchanged; otherwise a new entry
    /// is inserted in sorted position and the count grows by one.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>, kind: RecordKind) {
        self.map.insert(key.clone(), Record { kind, key, value });
    }

    /// Inserts or overwrites `record` using its own key.
    pub fn apply(&mut self, record: Record) {
        self.map.insert(record.key.clone(), record);
    }

    /// Returns the stored record for `key`, if present.
    ///
    /// A tombstone is returned as-is (`kind == RecordKind::Delete`, empty
    /// value) — it is the engine's job, not the memtable's, to interpret
    /// that as "not found".
    pub fn get(&self, key: &[u8]) -> Option<&Record> {
        self.map.get(key)
    }

    /// Returns `true` if the memtable holds an entry (live or tombstoned)
    /// for `key`.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Returns an iterator over all entries in ascending key order. Includes
    /// tombstones.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.map.values()
    }

    /// Returns the number of distinct keys (including tombstones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the memtable holds zero entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries, resetting the memtable to empty.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}
