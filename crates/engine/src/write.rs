//! Write path: `put()`, `delete()`, and the internal flush.
//!
//! Every mutation is appended to the WAL before it touches the Memtable. If
//! the append fails, the Memtable is left untouched and the caller learns of
//! the failure -- the operation is not considered committed.
use memtable::Record;
use tracing::info;

use crate::{Engine, Inner, SSTableWriter};

impl Engine {
    /// Inserts or overwrites `key` with `value` (the `PUT` command).
    ///
    /// Appends a `PUT` record to the WAL, applies it to the Memtable, and
    /// flushes to a new SSTable if the Memtable has reached
    /// `memtable_limit` distinct keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the WAL append or a triggered flush fails. On
    /// WAL-append failure the Memtable is left unchanged.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> anyhow::Result<()> {
        self.write(Record::put(key, value))
    }

    /// Marks `key` as logically deleted (the `DEL` command).
    ///
    /// A delete is a WAL/Memtable record like any other -- `kind = DELETE`,
    /// empty value -- never a physical removal. Physical removal happens
    /// only during [`compact`](Engine::compact).
    pub fn delete(&self, key: Vec<u8>) -> anyhow::Result<()> {
        self.write(Record::delete(key))
    }

    fn write(&self, record: Record) -> anyhow::Result<()> {
        let mut guard = self.inner.write().unwrap();

        guard.wal.append(&record)?;
        guard.mem.apply(record);

        if guard.mem.len() >= self.config.memtable_limit {
            self.flush_locked(&mut guard)?;
        }

        Ok(())
    }

    /// Flushes the Memtable to a new SSTable right now, regardless of its
    /// size. A no-op if the Memtable is empty.
    ///
    /// # Errors
    ///
    /// Returns an error on SSTable-write or WAL-truncate failure.
    pub fn force_flush(&self) -> anyhow::Result<()> {
        let mut guard = self.inner.write().unwrap();
        if guard.mem.is_empty() {
            return Ok(());
        }
        self.flush_locked(&mut guard)
    }

    /// Flushes the current Memtable under an already-held exclusive lock.
    ///
    /// 1. Write the Memtable's contents to a new SSTable (flush writer).
    /// 2. Truncate the WAL -- the signal that the flush succeeded.
    /// 3. Replace the Memtable with an empty one.
    fn flush_locked(&self, guard: &mut Inner) -> anyhow::Result<()> {
        let token = guard.next_token;
        guard.next_token += 1;
        let name = format!("sstable_{:020}.db", token);
        let path = self.config.data_dir.join(&name);
        let record_count = guard.mem.len();

        SSTableWriter::write_from_memtable(&path, &guard.mem, self.config.bloom_bytes)?;

        guard.wal.truncate()?;
        guard.mem.clear();
        guard.sstables.push(path.clone());

        info!(
            path = %path.display(),
            records = record_count,
            "memtable flushed"
        );

        Ok(())
    }
}
