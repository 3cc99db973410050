use super::helpers::count_sst_files;
use crate::Engine;
use anyhow::Result;
use config::EngineConfig;
use tempfile::tempdir;

fn open(dir: &std::path::Path, memtable_limit: usize) -> Result<Engine> {
    Ok(Engine::open(
        EngineConfig::new(memtable_limit, 256, dir.join("wal.log"), dir.join("sst")),
        false,
    )?)
}

#[test]
fn put_and_get() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"name".to_vec(), b"alice".to_vec())?;
    assert_eq!(engine.get(b"name")?, Some(b"alice".to_vec()));
    Ok(())
}

#[test]
fn get_missing_key_returns_none() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    assert_eq!(engine.get(b"missing")?, None);
    Ok(())
}

#[test]
fn put_overwrites_previous_value() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.put(b"a".to_vec(), b"2".to_vec())?;
    assert_eq!(engine.get(b"a")?, Some(b"2".to_vec()));
    assert_eq!(engine.memtable_len(), 1);
    Ok(())
}

#[test]
fn delete_shadows_a_prior_put_in_the_memtable() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.delete(b"a".to_vec())?;
    assert_eq!(engine.get(b"a")?, None);

    engine.put(b"a".to_vec(), b"3".to_vec())?;
    assert_eq!(engine.get(b"a")?, Some(b"3".to_vec()));
    Ok(())
}

#[test]
fn flush_triggers_when_memtable_reaches_limit() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 3)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.put(b"b".to_vec(), b"2".to_vec())?;
    engine.put(b"c".to_vec(), b"3".to_vec())?; // hits the limit, flushes
    engine.put(b"b".to_vec(), b"22".to_vec())?;

    assert_eq!(engine.get(b"a")?, Some(b"1".to_vec()));
    assert_eq!(engine.get(b"b")?, Some(b"22".to_vec()));
    assert_eq!(engine.get(b"c")?, Some(b"3".to_vec()));

    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(count_sst_files(dir.path().join("sst").as_path()), 1);
    assert_eq!(engine.memtable_len(), 1);
    Ok(())
}

#[test]
fn force_flush_is_a_noop_on_an_empty_memtable() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.force_flush()?;
    assert_eq!(engine.sstable_count(), 0);
    Ok(())
}

#[test]
fn force_flush_writes_an_sstable_and_empties_the_memtable() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.force_flush()?;

    assert_eq!(engine.memtable_len(), 0);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get(b"a")?, Some(b"1".to_vec()));
    Ok(())
}

#[test]
fn wal_holds_exactly_the_post_flush_record() -> Result<()> {
    let dir = tempdir()?;
    let wal_path = dir.path().join("wal.log");
    let engine = open(dir.path(), 3)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.put(b"b".to_vec(), b"2".to_vec())?;
    engine.put(b"c".to_vec(), b"3".to_vec())?; // flush
    engine.put(b"d".to_vec(), b"4".to_vec())?;

    let mut reader = wal::WalReader::open(&wal_path)?;
    let mut count = 0;
    reader.replay(|_| count += 1)?;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn delete_is_never_a_physical_removal_before_compaction() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    engine.force_flush()?;
    engine.delete(b"a".to_vec())?;
    engine.force_flush()?;

    // Two SSTables: the original PUT and the tombstone. Compaction has not
    // run, so both files still exist on disk.
    assert_eq!(engine.sstable_count(), 2);
    assert_eq!(engine.get(b"a")?, None);
    Ok(())
}

#[test]
fn empty_value_round_trips() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"empty".to_vec(), Vec::new())?;
    assert_eq!(engine.get(b"empty")?, Some(Vec::new()));
    Ok(())
}
