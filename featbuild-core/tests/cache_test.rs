use std::fs;

use featbuild_core::cache::{CacheStore, FileCacheStore};
use featbuild_core::{Error, Fingerprint};
use tempfile::TempDir;

#[test]
fn test_cache_miss() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCacheStore::new(temp_dir.path().join(".builder-cache"));

    assert!(cache.read("base").unwrap().is_none());
}

#[test]
fn test_cache_write_and_read() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCacheStore::new(temp_dir.path().join(".builder-cache"));
    let fingerprint = Fingerprint::new("abc123");

    cache.write("base", &fingerprint).unwrap();

    assert_eq!(cache.read("base").unwrap(), Some(fingerprint));
    assert!(cache.read("app").unwrap().is_none());
}

#[test]
fn test_cache_layout_is_raw_text_per_feature() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join(".builder-cache");
    let cache = FileCacheStore::new(&cache_dir);

    cache.write("app", &Fingerprint::new("deadbeef")).unwrap();

    let record = cache_dir.join("app").join("hash");
    assert_eq!(cache.record_path("app"), record);
    assert_eq!(fs::read_to_string(record).unwrap(), "deadbeef");
}

#[test]
fn test_cache_overwrite_last_write_wins() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCacheStore::new(temp_dir.path());

    cache.write("base", &Fingerprint::new("h1")).unwrap();
    cache.write("base", &Fingerprint::new("h2")).unwrap();

    assert_eq!(cache.read("base").unwrap(), Some(Fingerprint::new("h2")));
}

#[test]
fn test_cache_read_trims_hand_edited_records() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCacheStore::new(temp_dir.path());
    fs::create_dir_all(temp_dir.path().join("base")).unwrap();
    fs::write(temp_dir.path().join("base/hash"), "h1\n").unwrap();

    assert_eq!(cache.read("base").unwrap(), Some(Fingerprint::new("h1")));
}

#[test]
fn test_cache_clear_one_and_all() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("cache");
    let cache = FileCacheStore::new(&cache_dir);
    cache.write("base", &Fingerprint::new("h1")).unwrap();
    cache.write("app", &Fingerprint::new("h2")).unwrap();

    cache.clear(Some("base")).unwrap();
    assert!(cache.read("base").unwrap().is_none());
    assert!(cache.read("app").unwrap().is_some());

    cache.clear(None).unwrap();
    assert!(!cache_dir.exists());

    // Clearing an absent cache is not an error.
    cache.clear(None).unwrap();
}

#[test]
fn test_unreadable_record_is_cache_error() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCacheStore::new(temp_dir.path());
    fs::create_dir_all(temp_dir.path().join("base/hash")).unwrap();

    assert!(matches!(cache.read("base"), Err(Error::Cache { .. })));
}

#[test]
fn test_write_failure_is_cache_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let cache = FileCacheStore::new(&blocker);

    let result = cache.write("base", &Fingerprint::new("h1"));
    assert!(matches!(result, Err(Error::Cache { ref feature, .. }) if feature == "base"));
}
