//! K-way merge over ordered SSTable iterators.
//!
//! Produces a sorted, de-duplicated stream of `PUT` records. When the same
//! key appears in several input files, the **winner** is whichever iterator
//! is chronologically newest — not the one with the largest value or any
//! other property of the record itself. The caller is responsible for
//! supplying `iters` sorted oldest-first; "chronologically newest" then
//! means "latest position in the slice".
//!
//! Tombstones never survive a full merge: a winning `DELETE` record causes
//! the key to be dropped from the output entirely, and every older
//! duplicate of that key (`PUT` or `DELETE`) is discarded along with it.

use crate::iterator::SSTableIterator;
use crate::SSTableError;
use memtable::{Record, RecordKind};

/// Drives a k-way merge across a set of per-file iterators.
pub struct MergeIterator {
    /// Input iterators, ordered oldest-first (matching input file age).
    iters: Vec<SSTableIterator>,
    /// Count of keys whose winning record was a tombstone, dropped rather
    /// than emitted. Surfaced to the engine so compaction can log it.
    tombstones_dropped: u64,
}

impl MergeIterator {
    /// Builds a merge iterator over `iters`, which must already be primed
    /// (each at its first record) and ordered oldest-first.
    pub fn new(iters: Vec<SSTableIterator>) -> Self {
        Self {
            iters,
            tombstones_dropped: 0,
        }
    }

    /// Number of keys dropped so far because their winning record was a
    /// tombstone. Meaningful once the merge is fully drained.
    #[must_use]
    pub fn tombstones_dropped(&self) -> u64 {
        self.tombstones_dropped
    }

    /// Returns the next surviving `PUT` record in ascending key order, or
    /// `None` once every input iterator is exhausted.
    pub fn next_record(&mut self) -> Result<Option<Record>, SSTableError> {
        loop {
            let min_key = match self
                .iters
                .iter()
                .filter_map(|it| it.current_key())
                .min()
                .map(<[u8]>::to_vec)
            {
                Some(k) => k,
                None => return Ok(None),
            };

            let mut winner_kind: Option<RecordKind> = None;
            let mut winner_value: Vec<u8> = Vec::new();
            for it in &self.iters {
                if it.current_key() == Some(min_key.as_slice()) {
                    winner_kind = it.current_kind();
                    winner_value = it.current_value().unwrap_or(&[]).to_vec();
                }
            }

            for it in &mut self.iters {
                if it.current_key() == Some(min_key.as_slice()) {
                    it.advance()?;
                }
            }

            match winner_kind {
                Some(RecordKind::Put) => return Ok(Some(Record::put(min_key, winner_value))),
                Some(RecordKind::Delete) => {
                    self.tombstones_dropped += 1;
                    continue;
                }
                None => continue,
            }
        }
    }

    /// Collects every surviving record, consuming the merge.
    ///
    /// Returns the records alongside the number of tombstoned keys dropped
    /// along the way, for the caller to log.
    pub fn collect_all(mut self) -> Result<(Vec<Record>, u64), SSTableError> {
        let mut out = Vec::new();
        while let Some(record) = self.next_record()? {
            out.push(record);
        }
        Ok((out, self.tombstones_dropped))
    }

    /// Explicitly releases every input iterator's file handle.
    pub fn close(self) {
        for it in self.iters {
            it.close();
        }
    }
}
