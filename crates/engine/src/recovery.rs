//! Cold-start path: WAL replay and SSTable directory scanning.
use crate::TEMP_PREFIX;
use anyhow::Context;
use memtable::Memtable;
use std::path::{Path, PathBuf};
use wal::WalReader;

/// Replays `path` into `mem`, if the WAL file exists.
///
/// A fresh database has no WAL file yet; that is not an error.
pub(crate) fn replay_wal(path: &Path, mem: &mut Memtable) -> anyhow::Result<()> {
    match WalReader::open(path) {
        Ok(mut reader) => reader
            .replay(|record| mem.apply(record))
            .with_context(|| format!("replaying WAL at {}", path.display())),
        Err(wal::WalError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("opening WAL at {}", path.display())),
    }
}

/// Removes any leftover `temp_`-prefixed files in `dir`.
///
/// These are the discardable remains of a flush or compaction that never
/// reached its atomic rename before the process died.
pub(crate) fn cleanup_temp_files(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with(TEMP_PREFIX) {
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}

/// Scans `dir` for durable SSTable files, returning them oldest-first along
/// with the next monotonic token to use for a newly created file.
///
/// Durable names match `sstable_<token>.db` or `sstable_<token>_compacted.db`;
/// anything else (including `temp_`-prefixed files) is ignored.
pub(crate) fn load_sstables(dir: &Path) -> anyhow::Result<(Vec<PathBuf>, u64)> {
    let mut found: Vec<(u64, PathBuf)> = Vec::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("scanning data directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(TEMP_PREFIX) {
            continue;
        }
        if let Some(token) = parse_token(name) {
            found.push((token, path));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let next_token = found.last().map(|(t, _)| t + 1).unwrap_or(0);
    Ok((found.into_iter().map(|(_, p)| p).collect(), next_token))
}

/// Parses the monotonic token out of a durable SSTable file name.
///
/// Accepts both `sstable_<token>.db` and `sstable_<token>_compacted.db`.
fn parse_token(name: &str) -> Option<u64> {
    let rest = name.strip_prefix("sstable_")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod token_tests {
    use super::parse_token;

    #[test]
    fn parses_flush_name() {
        assert_eq!(parse_token("sstable_00000000000000000007.db"), Some(7));
    }

    #[test]
    fn parses_compacted_name() {
        assert_eq!(
            parse_token("sstable_00000000000000000012_compacted.db"),
            Some(12)
        );
    }

    #[test]
    fn rejects_unrelated_name() {
        assert_eq!(parse_token("wal.log"), None);
        assert_eq!(parse_token("temp_sstable_1.db"), None);
    }
}
