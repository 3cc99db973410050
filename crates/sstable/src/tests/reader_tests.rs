use crate::*;
use anyhow::Result;
use memtable::{Memtable, RecordKind};
use std::path::Path;
use tempfile::tempdir;

fn make_sample_memtable() -> Memtable {
    let mut m = Memtable::new();
    m.put(b"a".to_vec(), b"apple".to_vec(), RecordKind::Put);
    m.put(b"b".to_vec(), b"banana".to_vec(), RecordKind::Put);
    m.put(b"c".to_vec(), Vec::new(), RecordKind::Put);
    m.put(b"d".to_vec(), Vec::new(), RecordKind::Delete);
    m
}

#[test]
fn search_file_finds_every_entry() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sample.db");

    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(&path, &mem, 256)?;

    let a = search_file(&path, b"a", 256)?.expect("a must exist");
    assert_eq!(a.kind, RecordKind::Put);
    assert_eq!(a.value, b"apple");

    let b = search_file(&path, b"b", 256)?.expect("b must exist");
    assert_eq!(b.value, b"banana");

    let c = search_file(&path, b"c", 256)?.expect("c must exist");
    assert_eq!(c.kind, RecordKind::Put);
    assert!(c.value.is_empty());

    let d = search_file(&path, b"d", 256)?.expect("d (tombstone) must exist");
    assert_eq!(d.kind, RecordKind::Delete);
    assert!(d.value.is_empty());

    assert!(search_file(&path, b"nope", 256)?.is_none());
    Ok(())
}

#[test]
fn sstable_reader_get_matches_search_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sample.db");
    let mem = make_sample_memtable();
    SSTableWriter::write_from_memtable(&path, &mem, 256)?;

    let reader = SSTableReader::open(&path)?;
    assert_eq!(reader.path(), path.as_path());
    let a = reader.get(b"a", 256)?.unwrap();
    assert_eq!(a.value, b"apple");
    assert!(reader.get(b"missing", 256)?.is_none());
    Ok(())
}

#[test]
fn large_value_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bigval.db");

    let mut mem = Memtable::new();
    let big = vec![b'x'; 500_000];
    mem.put(b"big".to_vec(), big.clone(), RecordKind::Put);
    SSTableWriter::write_from_memtable(&path, &mem, 256)?;

    let entry = search_file(&path, b"big", 256)?.unwrap();
    assert_eq!(entry.value.len(), 500_000);
    assert_eq!(entry.value, big);
    Ok(())
}

#[test]
fn bloom_filter_finds_all_inserted_keys() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bloom_hit.db");

    let mut mem = Memtable::new();
    for i in 0..500u64 {
        mem.put(
            format!("key{:04}", i).into_bytes(),
            b"v".to_vec(),
            RecordKind::Put,
        );
    }
    SSTableWriter::write_from_memtable(&path, &mem, 1024)?;

    for i in 0..500u64 {
        let key = format!("key{:04}", i).into_bytes();
        assert!(
            search_file(&path, &key, 1024)?.is_some(),
            "key{:04} should exist",
            i
        );
    }
    Ok(())
}

#[test]
fn bloom_filter_rejects_most_missing_keys() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bloom_miss.db");

    let mut mem = Memtable::new();
    for i in 0..100u64 {
        mem.put(
            format!("exist{:04}", i).into_bytes(),
            b"v".to_vec(),
            RecordKind::Put,
        );
    }
    SSTableWriter::write_from_memtable(&path, &mem, 1024)?;

    // False positives are tolerated; false negatives are not -- only check
    // that the filter rejects the overwhelming majority of absent keys.
    let mut misses = 0;
    for i in 0..100u64 {
        let key = format!("missing{:04}", i).into_bytes();
        if search_file(&path, &key, 1024)?.is_none() {
            misses += 1;
        }
    }
    assert!(
        misses > 90,
        "bloom filter should reject most missing keys, got {} misses out of 100",
        misses
    );
    Ok(())
}

#[test]
fn search_file_too_small_returns_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.db");
    std::fs::write(&path, b"short").unwrap();

    let result = search_file(&path, b"anything", 64).unwrap();
    assert!(result.is_none());
}

#[test]
fn search_file_missing_path_returns_not_found() {
    let result = search_file(Path::new("/tmp/no_such_file_riptide.db"), b"k", 64).unwrap();
    assert!(result.is_none());
}

#[test]
fn iterator_yields_keys_in_ascending_order() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sorted.db");

    let mut mem = Memtable::new();
    mem.put(b"z".to_vec(), b"1".to_vec(), RecordKind::Put);
    mem.put(b"a".to_vec(), b"2".to_vec(), RecordKind::Put);
    mem.put(b"m".to_vec(), b"3".to_vec(), RecordKind::Put);
    SSTableWriter::write_from_memtable(&path, &mem, 64)?;

    let mut iter = SSTableIterator::open(&path)?;
    let mut keys = Vec::new();
    while let Some(k) = iter.current_key() {
        keys.push(k.to_vec());
        iter.advance()?;
    }
    assert_eq!(keys, vec![b"a".to_vec(), b"m".to_vec(), b"z".to_vec()]);
    Ok(())
}

#[test]
fn repeated_point_lookups_on_same_reader() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("multi.db");

    let mut mem = Memtable::new();
    for i in 0..100u64 {
        mem.put(
            format!("k{:03}", i).into_bytes(),
            format!("v{}", i).into_bytes(),
            RecordKind::Put,
        );
    }
    SSTableWriter::write_from_memtable(&path, &mem, 512)?;

    let reader = SSTableReader::open(&path)?;
    for _ in 0..2 {
        for i in 0..100u64 {
            let key = format!("k{:03}", i).into_bytes();
            let entry = reader.get(&key, 512)?.unwrap();
            assert_eq!(entry.value, format!("v{}", i).into_bytes());
        }
    }
    Ok(())
}
