use ahash::AHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-table catalog lookups shared by every connection built from the same options.
///
/// Entries are filled on first lookup and kept until [`invalidate`](Self::invalidate)
/// or [`clear`](Self::clear). Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    inner: Arc<Mutex<CatalogEntries>>,
}

#[derive(Debug, Default)]
struct CatalogEntries {
    columns: AHashMap<String, Vec<String>>,
    // `None` records a table that has no usable key
    primary_keys: AHashMap<String, Option<String>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CatalogEntries> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached column names of `table`.
    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.lock().columns.get(table).cloned()
    }

    pub fn set_columns(&self, table: &str, columns: Vec<String>) {
        self.lock().columns.insert(table.to_owned(), columns);
    }

    /// Cached primary key of `table`.
    ///
    /// The outer `Option` is the cache hit; the inner one is the key itself.
    pub fn primary_key(&self, table: &str) -> Option<Option<String>> {
        self.lock().primary_keys.get(table).cloned()
    }

    pub fn set_primary_key(&self, table: &str, primary_key: Option<String>) {
        self.lock()
            .primary_keys
            .insert(table.to_owned(), primary_key);
    }

    /// Forgets everything cached for `table`.
    pub fn invalidate(&self, table: &str) {
        let mut entries = self.lock();
        entries.columns.remove(table);
        entries.primary_keys.remove(table);
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.columns.clear();
        entries.primary_keys.clear();
    }
}
