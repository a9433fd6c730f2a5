//! Filesystem cache backend
//!
//! Stores one JSON file per entry under a root directory. The file path is
//! derived from the SHA-256 of the key, fanned out over two levels of
//! two-character directories so no single directory grows unbounded:
//!
//! ```text
//! <root>/3b/3c/5df20dba87a27ba37021...
//! ```
//!
//! Entries carry an optional `expires` unix timestamp. Expired and
//! unreadable entries are deleted the next time they are touched, so stale
//! files cost one extra read and nothing after that.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::{Cache, CacheStats, CacheValue};
use crate::error::{CacheError, Result};

/// On-disk shape of one entry
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    value: CacheValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<u64>,
}

/// One-file-per-entry backend rooted at a directory
pub struct FileCache {
    root: PathBuf,
    default_ttl: Option<Duration>,
    stats: CacheStats,
}

impl FileCache {
    /// Open (and create if needed) a cache rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| CacheError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            default_ttl: None,
            stats: CacheStats::default(),
        })
    }

    /// Apply this TTL to entries stored without an explicit one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Root directory of this cache
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
        self.root
            .join(&digest[0..2])
            .join(&digest[2..4])
            .join(&digest[4..])
    }

    /// Read an entry, deleting it on the way out if it is expired or
    /// corrupt. Counter bookkeeping is left to the caller.
    fn read_entry(&self, key: &str) -> Option<CacheValue> {
        let path = self.entry_path(key);
        let raw = fs::read_to_string(&path).ok()?;

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("discarding corrupt cache entry {}: {err}", path.display());
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        if let Some(expires) = entry.expires {
            if now_unix() > expires {
                debug!("cache entry expired: {}", path.display());
                let _ = fs::remove_file(&path);
                return None;
            }
        }

        Some(entry.value)
    }
}

impl Cache for FileCache {
    fn get(&mut self, key: &str) -> Option<CacheValue> {
        match self.read_entry(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: CacheValue, ttl: Option<Duration>) -> Result<()> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let entry = StoredEntry {
            value,
            expires: ttl
                .or(self.default_ttl)
                .map(|ttl| now_unix() + ttl.as_secs()),
        };
        let json =
            serde_json::to_string(&entry).map_err(|err| CacheError::Serialize(err.to_string()))?;

        // Write-then-rename so readers never see a half-written entry.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| CacheError::Io { path, source })?;
        Ok(())
    }

    fn has(&mut self, key: &str) -> bool {
        self.read_entry(key).is_some()
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn clear(&mut self) -> Result<()> {
        // Contents-first so directories are empty by the time we reach them;
        // the root itself stays.
        for entry in WalkDir::new(&self.root).min_depth(1).contents_first(true) {
            let entry = entry.map_err(|err| CacheError::Io {
                path: self.root.clone(),
                source: err.into(),
            })?;
            let path = entry.path();
            let removed = if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            removed.map_err(|source| CacheError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        self.stats = CacheStats::default();
        Ok(())
    }

    fn len(&self) -> usize {
        WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .count()
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> FileCache {
        FileCache::new(dir.path().join("cache")).unwrap()
    }

    #[test]
    fn test_set_and_get_both_value_kinds() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("r", CacheValue::Ratio(4.54), None).unwrap();
        cache
            .set("c", CacheValue::Color(Color::new(0x75, 0x75, 0x75)), None)
            .unwrap();

        assert_eq!(cache.get("r").unwrap().as_ratio(), Some(4.54));
        assert_eq!(
            cache.get("c").unwrap().as_color().unwrap().to_hex(),
            "#757575"
        );
    }

    #[test]
    fn test_entries_survive_reopening() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("cache");

        let mut cache = FileCache::new(&root).unwrap();
        cache.set("k", CacheValue::Ratio(21.0), None).unwrap();
        drop(cache);

        let mut reopened = FileCache::new(&root).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_ratio(), Some(21.0));
    }

    #[test]
    fn test_entry_path_shards_by_hash() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        // sha256("shade.#3b82f6-AA-normal") starts 3b3c5df2...
        let path = cache.entry_path("shade.#3b82f6-AA-normal");
        let relative = path.strip_prefix(cache.root()).unwrap();
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        assert_eq!(parts[0], "3b");
        assert_eq!(parts[1], "3c");
        assert!(parts[2].starts_with("5df20dba87a27ba37021"));
        assert_eq!(parts[2].len(), 60);
    }

    #[test]
    fn test_expired_entry_is_deleted_on_read() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(4.5), None).unwrap();
        let path = cache.entry_path("k");
        fs::write(&path, r#"{"value":4.5,"expires":1}"#).unwrap();

        assert_eq!(cache.get("k"), None);
        assert!(!path.exists());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_corrupt_entry_is_deleted_on_read() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(4.5), None).unwrap();
        let path = cache.entry_path("k");
        fs::write(&path, "not json at all").unwrap();

        assert_eq!(cache.get("k"), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_unexpired_ttl_entry_is_served() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache
            .set("k", CacheValue::Ratio(1.0), Some(Duration::from_secs(3600)))
            .unwrap();
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_default_ttl_applies_when_set_has_none() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir).with_default_ttl(Duration::from_secs(3600));

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        let raw = fs::read_to_string(cache.entry_path("k")).unwrap();
        assert!(raw.contains("expires"));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_no_ttl_means_no_expiry_field() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        let raw = fs::read_to_string(cache.entry_path("k")).unwrap();
        assert!(!raw.contains("expires"));
    }

    #[test]
    fn test_has_probes_without_counting() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        assert!(cache.has("k"));
        assert!(!cache.has("missing"));
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        cache.delete("k").unwrap();
        assert!(!cache.has("k"));

        // Deleting a missing key is fine.
        cache.delete("k").unwrap();
    }

    #[test]
    fn test_overwrite_same_key_keeps_one_file() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        cache.set("k", CacheValue::Ratio(2.0), None).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().as_ratio(), Some(2.0));
    }

    #[test]
    fn test_clear_empties_tree_but_keeps_root() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        for i in 0..5 {
            cache
                .set(&format!("k{i}"), CacheValue::Ratio(i as f64), None)
                .unwrap();
        }
        assert_eq!(cache.len(), 5);

        cache.clear().unwrap();
        assert_eq!(cache.len(), 0);
        assert!(cache.root().exists());
        assert_eq!(cache.stats(), CacheStats::default());

        // Still usable afterwards.
        cache.set("again", CacheValue::Ratio(9.0), None).unwrap();
        assert!(cache.has("again"));
    }

    #[test]
    fn test_counters_track_gets() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();
        cache.get("k");
        cache.get("k");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }
}
