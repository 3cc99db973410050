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
fn memtable_shadows_an_older_sstable() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"key".to_vec(), b"old".to_vec())?;
    engine.force_flush()?;
    engine.put(b"key".to_vec(), b"new".to_vec())?;

    assert_eq!(engine.get(b"key")?, Some(b"new".to_vec()));
    Ok(())
}

#[test]
fn newer_sstable_shadows_an_older_one() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"key".to_vec(), b"old".to_vec())?;
    engine.force_flush()?;
    engine.put(b"key".to_vec(), b"new".to_vec())?;
    engine.force_flush()?;

    assert_eq!(engine.sstable_count(), 2);
    assert_eq!(engine.get(b"key")?, Some(b"new".to_vec()));
    Ok(())
}

#[test]
fn tombstone_in_memtable_shadows_an_sstable_value() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"key".to_vec(), b"old".to_vec())?;
    engine.force_flush()?;
    engine.delete(b"key".to_vec())?;

    assert_eq!(engine.get(b"key")?, None);
    Ok(())
}

#[test]
fn tombstone_flushed_to_a_newer_sstable_shadows_an_older_put() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    engine.put(b"key".to_vec(), b"old".to_vec())?;
    engine.force_flush()?;
    engine.delete(b"key".to_vec())?;
    engine.force_flush()?;

    assert_eq!(engine.sstable_count(), 2);
    assert_eq!(engine.get(b"key")?, None);
    Ok(())
}

#[test]
fn unrelated_keys_across_many_sstables_are_all_visible() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;

    for i in 0..10u32 {
        engine.put(format!("k{:02}", i).into_bytes(), format!("v{}", i).into_bytes())?;
        engine.force_flush()?;
    }

    assert_eq!(engine.sstable_count(), 10);
    for i in 0..10u32 {
        let key = format!("k{:02}", i).into_bytes();
        assert_eq!(engine.get(&key)?, Some(format!("v{}", i).into_bytes()));
    }
    Ok(())
}

#[test]
fn get_on_an_empty_engine_returns_none() -> Result<()> {
    let dir = tempdir()?;
    let engine = open(dir.path(), 1024)?;
    assert_eq!(engine.get(b"anything")?, None);
    Ok(())
}
