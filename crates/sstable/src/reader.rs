use crate::format::read_footer;
use crate::SSTableError;
use bloom::BloomFilter;
use memtable::{decode_record, encoded_len, Record};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Performs a filter-gated point lookup for `key` inside the SSTable at
/// `path`, whose bloom filter is `bloom_bytes` bytes.
///
/// This is the file format's only lookup strategy: there is no in-file
/// index, so a bloom-filter miss is the sole acceleration available; a hit
/// falls through to a linear scan of the data region.
pub fn search_file(
    path: &Path,
    key: &[u8],
    bloom_bytes: usize,
) -> Result<Option<Record>, SSTableError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if metadata.len() < 8 {
        return Ok(None);
    }

    let mut file = File::open(path)?;
    let filter_offset = read_footer(&mut file)?;

    file.seek(SeekFrom::Start(filter_offset))?;
    let filter = BloomFilter::read_from(&mut file, bloom_bytes)?;
    if !filter.may_contain(key) {
        return Ok(None);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(file);
    let mut pos: u64 = 0;

    while pos < filter_offset {
        match decode_record(&mut reader)? {
            Some(record) => {
                pos += encoded_len(&record);
                if record.key == key {
                    return Ok(Some(record));
                }
            }
            None => break,
        }
    }

    Ok(None)
}

/// A handle onto an on-disk SSTable file, used for point lookups.
///
/// Unlike the teacher's index-backed reader, this reader holds no
/// in-memory state beyond the path: every [`get`](SSTableReader::get) is an
/// independent [`search_file`] call, per the file format's no-index design.
pub struct SSTableReader {
    path: PathBuf,
}

impl SSTableReader {
    /// Opens the SSTable at `path` for point lookups. The file is not read
    /// until the first [`get`](SSTableReader::get) call.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SSTableError> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Performs a point lookup for `key`.
    pub fn get(&self, key: &[u8], bloom_bytes: usize) -> Result<Option<Record>, SSTableError> {
        search_file(&self.path, key, bloom_bytes)
    }

    /// Returns the path this reader was opened against.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
