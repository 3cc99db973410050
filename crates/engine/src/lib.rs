//! # Engine - RiptideKV Storage Engine
//!
//! The central orchestrator tying together the [`memtable`], [`wal`], and
//! [`sstable`] crates into a complete LSM-tree key-value store.
//!
//! ## Write path
//!
//! 1. Append the record to the WAL.
//! 2. Apply the mutation to the in-memory Memtable.
//! 3. If the Memtable's distinct-key count reaches `memtable_limit`, flush it
//!    to a new SSTable and truncate the WAL.
//!
//! ## Read path
//!
//! 1. Check the Memtable (freshest data, includes tombstones).
//! 2. Check SSTables newest-to-oldest.
//! 3. First match wins; a tombstone shadows any older value.
//!
//! ## Compaction
//!
//! `compact()` merges every SSTable currently on disk into a single new
//! SSTable, dropping tombstones, and deletes the inputs. It is never run
//! automatically -- callers (the network front-end's `COMPACT` command, or a
//! test) invoke it explicitly.
//!
//! ## Recovery
//!
//! On construction ([`Engine::open`]) the WAL is replayed into a fresh
//! Memtable and the data directory is scanned for existing SSTable files.
mod compaction;
mod read;
mod recovery;
mod write;

use config::EngineConfig;
use memtable::Memtable;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::info;
use wal::WalWriter;

pub use sstable::{SSTableReader, SSTableWriter};

/// Prefix marking a file as an in-progress, not-yet-visible artifact.
///
/// [`SSTableWriter`] stages every output file under this prefix in the same
/// directory and only makes it visible via an atomic rename once the footer
/// has been written. The read path and directory scans skip any file still
/// wearing this prefix, so a process that dies mid-write or mid-compaction
/// leaves behind nothing but discardable clutter.
pub const TEMP_PREFIX: &str = "temp_";

/// The storage engine: Memtable + WAL + the on-disk SSTable set.
///
/// A single [`RwLock`] guards the Memtable/WAL pair and the list of known
/// SSTable files, matching the single-writer, multi-reader discipline: `put`,
/// `delete`, and `compact` take the exclusive mode; `get` takes the shared
/// mode.
pub struct Engine {
    config: EngineConfig,
    inner: RwLock<Inner>,
}

struct Inner {
    mem: Memtable,
    wal: WalWriter,
    /// Durable SSTable files, oldest first. Chronological order is
    /// maintained by construction (appended on flush/compaction) rather than
    /// re-derived from file names on every operation.
    sstables: Vec<PathBuf>,
    /// Next monotonic token to embed in a newly created SSTable's name.
    next_token: u64,
}

impl Engine {
    /// Opens (or creates) the engine rooted at `config`, replaying the WAL
    /// and loading any existing SSTable files.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created, the WAL
    /// cannot be opened, or an existing SSTable file cannot be read.
    pub fn open(config: EngineConfig, wal_sync: bool) -> anyhow::Result<Self> {
        use anyhow::Context;

        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;
        recovery::cleanup_temp_files(&config.data_dir);

        let mut mem = Memtable::new();
        recovery::replay_wal(&config.wal_path, &mut mem)?;

        let wal = WalWriter::create(&config.wal_path, wal_sync)
            .with_context(|| format!("opening WAL at {}", config.wal_path.display()))?;

        let (sstables, next_token) = recovery::load_sstables(&config.data_dir)?;

        info!(
            memtable_entries = mem.len(),
            wal_path = %config.wal_path.display(),
            data_dir = %config.data_dir.display(),
            sstable_count = sstables.len(),
            "engine recovered"
        );

        Ok(Self {
            config,
            inner: RwLock::new(Inner {
                mem,
                wal,
                sstables,
                next_token,
            }),
        })
    }

    /// Returns the configuration this engine was opened with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the number of SSTable files currently on disk.
    #[must_use]
    pub fn sstable_count(&self) -> usize {
        self.inner.read().unwrap().sstables.len()
    }

    /// Returns the number of distinct keys currently buffered in the
    /// Memtable (not yet flushed).
    #[must_use]
    pub fn memtable_len(&self) -> usize {
        self.inner.read().unwrap().mem.len()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.read().unwrap();
        f.debug_struct("Engine")
            .field("memtable_limit", &self.config.memtable_limit)
            .field("memtable_entries", &guard.mem.len())
            .field("sstable_count", &guard.sstables.len())
            .field("data_dir", &self.config.data_dir)
            .field("wal_path", &self.config.wal_path)
            .finish()
    }
}

#[cfg(test)]
mod tests;
