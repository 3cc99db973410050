use crate::format::write_footer;
use crate::SSTableError;
use bloom::BloomFilter;
use memtable::{encode_record, Record};
use std::fs::{rename, OpenOptions};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

/// Writes an ordered, de-duplicated sequence of records to disk as an
/// immutable SSTable file.
///
/// The writer is stateless — all work happens inside the two static entry
/// points below. The write is crash-safe: data is written to a
/// `temp_`-prefixed file in the same directory, fsynced, and then atomically
/// renamed to the final path.
pub struct SSTableWriter {}

impl SSTableWriter {
    /// Flushes `mem`'s entries to a new SSTable file at `path`.
    pub fn write_from_memtable(
        path: &Path,
        mem: &memtable::Memtable,
        bloom_bytes: usize,
    ) -> Result<(), SSTableError> {
        Self::write_internal(path, bloom_bytes, mem.iter().cloned())
    }

    /// Writes an SSTable from any iterator of records in ascending,
    /// de-duplicated key order. This is the compaction entry point: the
    /// caller (the merge) is responsible for ordering and deduplication.
    pub fn write_from_iterator<I>(
        path: &Path,
        bloom_bytes: usize,
        iter: I,
    ) -> Result<(), SSTableError>
    where
        I: Iterator<Item = Record>,
    {
        Self::write_internal(path, bloom_bytes, iter)
    }

    /// Shared implementation:
    /// 1. Append each record in the shared record encoding to a fresh file.
    /// 2. Build a bloom filter by adding every key written.
    /// 3. Record the byte offset `F` where the data region ends.
    /// 4. Write the raw filter bitset.
    /// 5. Write the 8-byte footer equal to `F`.
    /// 6. Close the file and atomically rename into place.
    fn write_internal<I>(path: &Path, bloom_bytes: usize, iter: I) -> Result<(), SSTableError>
    where
        I: Iterator<Item = Record>,
    {
        let tmp_path = temp_path_for(path);
        let raw_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut file = BufWriter::new(raw_file);

        let mut bloom = BloomFilter::new(bloom_bytes);
        let mut count: u64 = 0;

        for record in iter {
            bloom.add(&record.key);
            encode_record(&mut file, &record)?;
            count += 1;
        }

        if count == 0 {
            drop(file);
            let _ = std::fs::remove_file(&tmp_path);
            return Err(SSTableError::Empty);
        }

        let data_len = file.stream_position()?;
        bloom.write_to(&mut file)?;
        write_footer(&mut file, data_len)?;

        file.flush()?;
        file.into_inner()
            .map_err(std::io::IntoInnerError::into_error)?
            .sync_all()?;

        rename(&tmp_path, path)?;

        // Fsync the parent directory so the rename survives a crash.
        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

/// Builds the `temp_`-prefixed path a writer stages its output under before
/// renaming it into place at `final_path`.
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let file_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_name = format!("temp_{}", file_name);
    match final_path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}
