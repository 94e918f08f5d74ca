/*!
 * Directory-backed key-value cache with versioned envelopes
 *
 * Every entry is a zstd-compressed JSON envelope holding a timestamp, a
 * version number, and the serialized payload. A lookup whose stored
 * version differs from the requested one deletes the stale file and
 * reports a miss, so one mismatched read self-heals the cache.
 *
 * Failures in this layer are never fatal: the caller simply sees a miss
 * and re-fetches from the catalog.
 */

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Types that can address their own cache entry
pub trait Cacheable {
    /// Hierarchical cache key, e.g. `chunk/p1n1p0`
    fn cache_key(&self) -> String;
}

/// On-disk entry wrapper. The timestamp is recorded for inspection but no
/// expiry is enforced; entries live until a version bump invalidates them.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    timestamp: i64,
    version: i64,
    content: String,
}

/// A cache directory holding one compressed file per key
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open (creating if necessary) a cache rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            if !root.is_dir() {
                return Err(Error::Config(format!(
                    "cache path {} exists and is not a directory",
                    root.display()
                )));
            }
        } else {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    /// Per-user default cache directory
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("starstat"))
            .unwrap_or_else(|| PathBuf::from(".cache"))
    }

    /// Persist a value under its own key. Best effort: failures are logged
    /// and swallowed, never propagated.
    pub fn store<T>(&self, version: i64, value: &T)
    where
        T: Serialize + Cacheable,
    {
        let key = value.cache_key();
        let content = match serde_json::to_string(value) {
            Ok(content) => content,
            Err(e) => {
                warn!(key = %key, error = %e, "cache: failed to serialize payload");
                return;
            }
        };

        let envelope = Envelope {
            timestamp: Utc::now().timestamp(),
            version,
            content,
        };
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "cache: failed to serialize envelope");
                return;
            }
        };

        if let Err(e) = self.write_entry(&key, &bytes) {
            warn!(key = %key, error = %e, "cache: failed to write entry");
        }
    }

    /// Look up a value by key, requiring an exact version match.
    ///
    /// Returns `None` on a missing file, unreadable or corrupt entry, or
    /// version mismatch. A mismatched entry is deleted on the way out.
    pub fn find<T>(&self, version: i64, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let path = self.entry_path(key);
        let compressed = fs::read(&path).ok()?;

        let bytes = match zstd::decode_all(compressed.as_slice()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "cache: failed to decompress entry");
                return None;
            }
        };
        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = %key, error = %e, "cache: failed to parse envelope");
                return None;
            }
        };

        if envelope.version != version {
            debug!(
                key = %key,
                stored = envelope.version,
                wanted = version,
                "cache: version mismatch, discarding stale entry"
            );
            let _ = fs::remove_file(&path);
            return None;
        }

        match serde_json::from_str(&envelope.content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "cache: failed to parse payload");
                None
            }
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.zst"))
    }

    fn write_entry(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let compressed = zstd::encode_all(bytes, 0)?;

        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename keeps readers from ever seeing a torn entry.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, compressed)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    impl Cacheable for Sample {
        fn cache_key(&self) -> String {
            format!("sample/{}", self.name)
        }
    }

    fn sample() -> Sample {
        Sample {
            name: "vega".to_string(),
            count: 7,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.store(1, &sample());
        let found: Option<Sample> = store.find(1, "sample/vega");
        assert_eq!(found, Some(sample()));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let found: Option<Sample> = store.find(1, "sample/nothere");
        assert_eq!(found, None);
    }

    #[test]
    fn test_version_mismatch_deletes_entry() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.store(1, &sample());
        let found: Option<Sample> = store.find(2, "sample/vega");
        assert_eq!(found, None);

        // The stale entry was removed, so the original version misses too
        let found: Option<Sample> = store.find(1, "sample/vega");
        assert_eq!(found, None);
        assert!(!dir.path().join("sample/vega.json.zst").exists());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let path = dir.path().join("sample/vega.json.zst");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"definitely not zstd").unwrap();

        let found: Option<Sample> = store.find(1, "sample/vega");
        assert_eq!(found, None);
    }

    #[test]
    fn test_hierarchical_keys_create_subdirs() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.store(3, &sample());
        assert!(dir.path().join("sample/vega.json.zst").exists());
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.store(1, &sample());
        let updated = Sample {
            count: 99,
            ..sample()
        };
        store.store(1, &updated);

        let found: Option<Sample> = store.find(1, "sample/vega");
        assert_eq!(found, Some(updated));
    }

    #[test]
    fn test_open_rejects_file_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        assert!(CacheStore::open(&file).is_err());
    }

    #[test]
    fn test_open_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/cache");
        let _ = CacheStore::open(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
