//! Time-gated snapshot cache.
//!
//! Every analytic session rebuilds its views from the flat file; the cache
//! only bounds how often the file is re-read and re-parsed. Entries are
//! immutable behind `Arc`, so concurrent readers share snapshots safely.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use loop_core::LoopError;

use crate::table::SheetSet;

/// Default snapshot validity window.
pub const CACHE_TTL_SECS: i64 = 300; // 5 minutes

struct CacheEntry {
    data: Arc<SheetSet>,
    cached_at: DateTime<Utc>,
}

/// Snapshot cache keyed on source path.
pub struct SheetCache {
    ttl_secs: i64,
    entries: DashMap<PathBuf, CacheEntry>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self { ttl_secs, entries: DashMap::new() }
    }

    /// Load a snapshot, serving the cached parse while it is fresh. File
    /// changes inside the window are only observed after expiry.
    pub fn load(&self, path: &Path) -> Result<Arc<SheetSet>, LoopError> {
        if let Some(entry) = self.entries.get(path) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.ttl_secs {
                return Ok(entry.data.clone());
            }
        }

        let data = Arc::new(SheetSet::from_path(path)?);
        tracing::debug!(path = %path.display(), "snapshot cache refresh");
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry { data: data.clone(), cached_at: Utc::now() },
        );
        Ok(data)
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries.remove(path);
    }
}

impl Default for SheetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_snapshot(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("looplens-cache-{name}.csv"));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    const V1: &str = "# sheet:t\n\"a\"\n\"1\"\n";
    const V2: &str = "# sheet:t\n\"a\"\n\"1\"\n\"2\"\n";

    #[test]
    fn test_serves_cached_snapshot_inside_ttl() {
        let path = write_snapshot("fresh", V1);
        let cache = SheetCache::new();
        let first = cache.load(&path).unwrap();

        std::fs::write(&path, V2).unwrap();
        let second = cache.load(&path).unwrap();
        assert_eq!(first.table("t").unwrap().len(), second.table("t").unwrap().len());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_zero_ttl_rereads() {
        let path = write_snapshot("stale", V1);
        let cache = SheetCache::with_ttl(0);
        assert_eq!(cache.load(&path).unwrap().table("t").unwrap().len(), 1);

        std::fs::write(&path, V2).unwrap();
        assert_eq!(cache.load(&path).unwrap().table("t").unwrap().len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalidate_drops_entry() {
        let path = write_snapshot("invalidate", V1);
        let cache = SheetCache::new();
        cache.load(&path).unwrap();

        std::fs::write(&path, V2).unwrap();
        cache.invalidate(&path);
        assert_eq!(cache.load(&path).unwrap().table("t").unwrap().len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let cache = SheetCache::new();
        let err = cache.load(Path::new("/nonexistent/snapshot.csv")).unwrap_err();
        assert!(matches!(err, LoopError::SnapshotNotFound(_)));
    }
}
