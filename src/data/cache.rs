use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{LoadError, load_file};
use super::model::SalesDataset;

// ---------------------------------------------------------------------------
// Fingerprint – cheap identity of a source file's contents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, LoadError> {
        let meta = std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Fingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CacheEntry {
    path: PathBuf,
    fingerprint: Fingerprint,
    dataset: Arc<SalesDataset>,
}

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

/// Load-once handle for the source dataset.
///
/// The dataset is shared read-only; a new `Arc` is handed out only when the
/// path or the file's length / modification time changes.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reloading if the source changed.
    ///
    /// A failed reload keeps the previous entry.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SalesDataset>, LoadError> {
        let fingerprint = Fingerprint::of(path)?;

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.fingerprint == fingerprint {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        let dataset = Arc::new(load_file(path)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            fingerprint,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// The dataset currently held, if any, without touching the file system.
    pub fn current(&self) -> Option<Arc<SalesDataset>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.dataset))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW_A: &str = "10100,2003-01-06,10,100,80,1000,Ships,S18_1,France,Small,Shipped,Atelier,2003";
    const ROW_ZERO_PRICE: &str = "10100,2003-01-06,2,0,80,0,Ships,S18_3,France,Small,Shipped,Atelier,2003";
    const ROW_B: &str = "10101,2004-01-06,10,100,80,2000,Ships,S18_2,France,Small,Shipped,Baane,2004";

    fn write_source(path: &Path, rows: &[&str]) {
        let mut text = "ORDER_NUMBER,ORDER_DATE,QUANTITY_ORDERED,PRICE_EACH,MSRP,SALES,PRODUCTLINE,PRODUCTCODE,COUNTRY,DEALSIZE,STATUS,CUSTOMER_NAME,YEAR".to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn unchanged_source_returns_the_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_source(&path, &[ROW_A]);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_source_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_source(&path, &[ROW_A]);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.len(), 1);

        // Different length, so the fingerprint changes even on coarse mtimes.
        write_source(&path, &[ROW_A, ROW_B]);
        let second = cache.get_or_load(&path).unwrap();
        assert_eq!(second.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_reload_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_source(&path, &[ROW_A]);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();

        std::fs::write(&path, "not,a,sales,file\n1,2,3,4\n").unwrap();
        assert!(cache.get_or_load(&path).is_err());

        let kept = cache.current().unwrap();
        assert!(Arc::ptr_eq(&first, &kept));
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_source(&path, &[ROW_A, ROW_ZERO_PRICE]);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        cache.invalidate();
        assert!(cache.current().is_none());

        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }
}
