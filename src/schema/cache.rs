//! Per-version memoization of reconstructed schemas.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::Result;
use crate::version::RuntimeVersion;

use super::loader::{self, Schema};
use super::source::SchemaSource;

type Slot = Option<(RuntimeVersion, Arc<Schema>)>;

/// Holds the most recently reconstructed schema, tagged with its version.
///
/// Exactly one version is materialized at a time; requesting a different
/// version discards the previous snapshot and rebuilds. The rebuild runs
/// inside the slot's critical section, so concurrent callers reconstruct at
/// most once per version transition and only ever observe complete snapshots.
#[derive(Debug, Default)]
pub struct SchemaCache {
    slot: Mutex<Slot>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the schema for `requested`, rebuilding when the cached tag
    /// differs.
    pub fn get(&self, source: &SchemaSource, requested: RuntimeVersion) -> Result<Arc<Schema>> {
        let mut slot = self.lock();
        if let Some((tag, schema)) = slot.as_ref() {
            if *tag == requested {
                return Ok(Arc::clone(schema));
            }
        }

        debug!(version = %requested, "call map cache miss");
        let schema = Arc::new(loader::reconstruct(source, requested)?);
        *slot = Some((requested, Arc::clone(&schema)));
        Ok(schema)
    }

    /// Drop the cached snapshot; the next lookup reconstructs from scratch.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot only ever holds complete snapshots, so a poisoned lock
        // cannot expose partial state.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn source() -> SchemaSource {
        let base = r#"
            [version]
            major = 7
            minor = 3

            [functions.f]
            return = "int"
        "#;
        let delta = r#"
            [version]
            major = 7
            minor = 3

            [added.f]
            return = "int"
        "#;
        SchemaSource::from_toml(base, &[delta]).unwrap()
    }

    #[test]
    fn same_version_returns_the_shared_snapshot() {
        let cache = SchemaCache::new();
        let source = source();
        let first = cache.get(&source, RuntimeVersion::new(7, 3)).unwrap();
        let second = cache.get(&source, RuntimeVersion::new(7, 3)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn version_change_rebuilds() {
        let cache = SchemaCache::new();
        let source = source();
        let newer = cache.get(&source, RuntimeVersion::new(7, 3)).unwrap();
        let older = cache.get(&source, RuntimeVersion::new(7, 2)).unwrap();
        assert!(!Arc::ptr_eq(&newer, &older));
        assert!(newer.contains("f"));
        assert!(!older.contains("f"));
    }

    #[test]
    fn invalidate_forces_a_rebuild() {
        let cache = SchemaCache::new();
        let source = source();
        let first = cache.get(&source, RuntimeVersion::new(7, 3)).unwrap();
        cache.invalidate();
        let second = cache.get(&source, RuntimeVersion::new(7, 3)).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reconstruction_errors_pass_through() {
        let cache = SchemaCache::new();
        let err = cache.get(&source(), RuntimeVersion::new(6, 0)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
    }

    #[test]
    fn concurrent_lookups_share_one_reconstruction() {
        let cache = Arc::new(SchemaCache::new());
        let source = Arc::new(source());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let source = Arc::clone(&source);
                std::thread::spawn(move || cache.get(&source, RuntimeVersion::new(7, 3)).unwrap())
            })
            .collect();

        let snapshots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for snapshot in &snapshots[1..] {
            assert!(Arc::ptr_eq(&snapshots[0], snapshot));
        }
    }
}
