//! # Config
//!
//! Deployment-wide configuration for the storage engine and its front-end.
//!
//! Configuration is always injected at construction time rather than
//! discovered at point of use, so tests can stand up multiple engines
//! against isolated directories in the same process.
use std::path::{Path, PathBuf};

/// Default number of distinct keys the memtable may hold before a flush is
/// triggered.
pub const DEFAULT_MEMTABLE_LIMIT: usize = 1024;

/// Default size, in bytes, of each SSTable's bloom filter bitset.
pub const DEFAULT_BLOOM_BYTES: usize = 1024;

/// Default write-ahead log path, relative to the process's working directory.
pub const DEFAULT_WAL_PATH: &str = "wal.log";

/// Default data directory holding SSTable files, relative to the process's
/// working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default TCP address the front-end listens on.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";

/// Engine-level configuration: everything the storage core needs to operate.
///
/// This is the injectable configuration described by the design notes —
/// embedders build an `EngineConfig` directly (e.g. against a
/// `tempfile::tempdir()` in tests) instead of the engine reaching for global
/// state or environment variables itself.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of distinct keys in the memtable that triggers a flush.
    pub memtable_limit: usize,
    /// Fixed size, in bytes, of each SSTable's bloom filter bitset.
    pub bloom_bytes: usize,
    /// Path to the write-ahead log file.
    pub wal_path: PathBuf,
    /// Directory holding SSTable files.
    pub data_dir: PathBuf,
}

impl EngineConfig {
    /// Builds a config from explicit values.
    pub fn new(
        memtable_limit: usize,
        bloom_bytes: usize,
        wal_path: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            memtable_limit,
            bloom_bytes,
            wal_path: wal_path.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Builds a config rooted at `dir`, using the default WAL filename and a
    /// `data` subdirectory for SSTables. Convenient for tests that only care
    /// about isolation, not specific paths.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            memtable_limit: DEFAULT_MEMTABLE_LIMIT,
            bloom_bytes: DEFAULT_BLOOM_BYTES,
            wal_path: dir.join(DEFAULT_WAL_PATH),
            data_dir: dir.join(DEFAULT_DATA_DIR),
        }
    }

    /// Reads configuration from the environment, falling back to the
    /// defaults above. Recognizes `MEMTABLE_LIMIT`, `BLOOM_BYTES`,
    /// `WAL_PATH`, and `DATA_DIR`.
    pub fn from_env() -> Self {
        Self {
            memtable_limit: env_parsed("MEMTABLE_LIMIT", DEFAULT_MEMTABLE_LIMIT),
            bloom_bytes: env_parsed("BLOOM_BYTES", DEFAULT_BLOOM_BYTES),
            wal_path: PathBuf::from(env_or("WAL_PATH", DEFAULT_WAL_PATH)),
            data_dir: PathBuf::from(env_or("DATA_DIR", DEFAULT_DATA_DIR)),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memtable_limit: DEFAULT_MEMTABLE_LIMIT,
            bloom_bytes: DEFAULT_BLOOM_BYTES,
            wal_path: PathBuf::from(DEFAULT_WAL_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Front-end-only configuration: the TCP bind address and the WAL durability
/// knob. Kept separate from `EngineConfig` because the storage core has no
/// notion of a network address, and `wal_sync` is a tuning knob layered on
/// top of the WAL's core append contract rather than part of it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP front-end listens on, e.g. `"127.0.0.1:7878"`.
    pub bind_addr: String,
    /// If `true`, every WAL append is followed by an `fsync`.
    pub wal_sync: bool,
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to the
    /// defaults. Recognizes `BIND_ADDR` and `WAL_SYNC`.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            wal_sync: env_parsed("WAL_SYNC", true),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            wal_sync: true,
        }
    }
}

/// Reads an environment variable, falling back to `default` if unset.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses an environment variable, falling back to `default` if
/// unset or unparsable.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
