//! Read path: `get()`.
//!
//! Checks the Memtable first, then SSTables newest-to-oldest. The first hit
//! wins -- a tombstone shadows any older value, whether that older value
//! lives in the Memtable (impossible, since the Memtable holds one entry per
//! key) or in an older SSTable.
use memtable::RecordKind;
use sstable::search_file;

use crate::Engine;

impl Engine {
    /// Looks up `key`, returning its value if live, `None` if absent or
    /// tombstoned.
    ///
    /// # Errors
    ///
    /// Returns an error if reading an SSTable file fails (I/O fault, not a
    /// decoding fault -- a malformed record is treated as "not found" in
    /// that file and the scan continues, per the SSTable reader contract).
    pub fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        let guard = self.inner.read().unwrap();

        if let Some(record) = guard.mem.get(key) {
            return Ok(match record.kind {
                RecordKind::Put => Some(record.value.clone()),
                RecordKind::Delete => None,
            });
        }

        for path in guard.sstables.iter().rev() {
            if let Some(record) = search_file(path, key, self.config.bloom_bytes)? {
                return Ok(match record.kind {
                    RecordKind::Put => Some(record.value),
                    RecordKind::Delete => None,
                });
            }
        }

        Ok(None)
    }
}
