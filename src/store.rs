//! Persistence of per-page metadata.
//!
//! Page metadata is written once at ingestion and read many times at query
//! time, keyed by `(document, page)`. The filesystem layout is
//! `{root}/{document}/{page}.json`.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::index::PageData;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Keyed storage of page metadata.
pub trait PageStore: Send + Sync {
    /// Load the metadata of one page.
    ///
    /// Returns [`Error::PageDataNotFound`] if the page was never stored.
    fn load(&self, document: &str, page: u32) -> Result<PageData>;

    /// Store the metadata of one page, replacing any previous record.
    fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()>;

    /// Whether metadata exists for the page.
    fn contains(&self, document: &str, page: u32) -> bool {
        self.load(document, page).is_ok()
    }
}

impl<S: PageStore + ?Sized> PageStore for Arc<S> {
    fn load(&self, document: &str, page: u32) -> Result<PageData> {
        (**self).load(document, page)
    }

    fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()> {
        (**self).save(document, page, data)
    }

    fn contains(&self, document: &str, page: u32) -> bool {
        (**self).contains(document, page)
    }
}

/// Open the filesystem store under `config.metadata_root`, wrapped in a
/// read-through cache when `config.cache_metadata` is set.
pub fn open_store(config: &IndexConfig) -> Arc<dyn PageStore> {
    let store = FsPageStore::new(&config.metadata_root);
    if config.cache_metadata {
        Arc::new(CachedPageStore::new(store))
    } else {
        Arc::new(store)
    }
}

/// Map a document id to a single safe path component.
///
/// Bytes outside the URL-unreserved set are percent-encoded, so distinct ids
/// always map to distinct directories and [`decode_document_id`] recovers
/// the original. Ids made only of dots have every dot encoded and the empty
/// id becomes `%`, so the result can never leave the root.
pub fn sanitize_document_id(document: &str) -> String {
    if document.is_empty() {
        return "%".to_string();
    }
    if document.chars().all(|c| c == '.') {
        return "%2E".repeat(document.len());
    }
    urlencoding::encode(document).into_owned()
}

/// Inverse of [`sanitize_document_id`].
pub fn decode_document_id(component: &str) -> Result<String> {
    if component == "%" {
        return Ok(String::new());
    }
    urlencoding::decode(component)
        .map(|id| id.into_owned())
        .map_err(|e| Error::InvalidDocumentId(format!("'{}': {}", component, e)))
}

/// JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for a page.
    pub fn page_path(&self, document: &str, page: u32) -> PathBuf {
        self.root
            .join(sanitize_document_id(document))
            .join(format!("{}.json", page))
    }
}

impl PageStore for FsPageStore {
    fn load(&self, document: &str, page: u32) -> Result<PageData> {
        let path = self.page_path(document, page);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::PageDataNotFound {
                    document: document.to_string(),
                    page,
                });
            },
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()> {
        let path = self.page_path(document, page);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Written under a temporary name and renamed, so a record is either
        // complete or absent.
        let tmp = path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, data)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &path)?;
        log::debug!("Saved page metadata to {}", path.display());
        Ok(())
    }

    fn contains(&self, document: &str, page: u32) -> bool {
        self.page_path(document, page).is_file()
    }
}

/// Read-through cache over another store.
///
/// Loads are idempotent, so concurrent misses on the same key may both hit
/// the inner store; the first insert wins.
#[derive(Debug)]
pub struct CachedPageStore<S> {
    inner: S,
    cache: RwLock<HashMap<(String, u32), PageData>>,
}

impl<S: PageStore> CachedPageStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached pages.
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl<S: PageStore> PageStore for CachedPageStore<S> {
    fn load(&self, document: &str, page: u32) -> Result<PageData> {
        let key = (document.to_string(), page);
        {
            let cache = self
                .cache
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(data) = cache.get(&key) {
                return Ok(data.clone());
            }
        }

        let data = self.inner.load(document, page)?;
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(key)
            .or_insert_with(|| data.clone());
        Ok(data)
    }

    fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()> {
        self.inner.save(document, page, data)?;
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((document.to_string(), page), data.clone());
        Ok(())
    }

    fn contains(&self, document: &str, page: u32) -> bool {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&(document.to_string(), page));
        cached || self.inner.contains(document, page)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: RwLock<HashMap<(String, u32), PageData>>,
}

impl MemoryPageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pages.
    pub fn len(&self) -> usize {
        self.pages
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageStore for MemoryPageStore {
    fn load(&self, document: &str, page: u32) -> Result<PageData> {
        self.pages
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(document.to_string(), page))
            .cloned()
            .ok_or_else(|| Error::PageDataNotFound {
                document: document.to_string(),
                page,
            })
    }

    fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()> {
        self.pages
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((document.to_string(), page), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::index::Dimensions;
    use crate::layout::WordBoxIndex;
    use crate::text::stem_words;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> PageData {
        let mut boxes = WordBoxIndex::new();
        boxes.insert("signal".into(), vec![BoundingBox::new(10.0, 40.0, 700.0, 712.0)]);
        let stems = stem_words(boxes.keys(), "en");
        PageData {
            boxes,
            stems,
            dimensions: Dimensions {
                scale: 2.0,
                orig_width: 612.0,
                orig_height: 792.0,
            },
        }
    }

    #[test]
    fn test_sanitize_document_id() {
        assert_eq!(sanitize_document_id("report-1945.v2"), "report-1945.v2");
        assert_eq!(sanitize_document_id("../etc/passwd"), "..%2Fetc%2Fpasswd");
        assert_eq!(sanitize_document_id(".."), "%2E%2E");
        assert_eq!(sanitize_document_id("."), "%2E");
        assert_eq!(sanitize_document_id(""), "%");
        assert_eq!(sanitize_document_id("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_document_ids_do_not_collide() {
        let ids = ["a b", "a_b", "a%20b", "a/b", "..", "%", "", "Straße"];
        assert!(matches!(
            decode_document_id("%FF"),
            Err(Error::InvalidDocumentId(_))
        ));
        let encoded: std::collections::BTreeSet<String> =
            ids.iter().map(|id| sanitize_document_id(id)).collect();
        assert_eq!(encoded.len(), ids.len());
        for id in ids {
            assert_eq!(decode_document_id(&sanitize_document_id(id)).unwrap(), id);
        }
    }

    #[test]
    fn test_fs_distinct_ids_keep_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());
        let mut other = sample();
        other.dimensions.scale = 3.0;

        store.save("a b", 0, &sample()).unwrap();
        store.save("a_b", 0, &other).unwrap();
        assert_eq!(store.load("a b", 0).unwrap(), sample());
        assert_eq!(store.load("a_b", 0).unwrap(), other);
    }

    #[test]
    fn test_fs_save_leaves_only_complete_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());
        store.save("doc", 0, &sample()).unwrap();
        store.save("doc", 0, &sample()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path().join("doc"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["0.json"]);
        let raw = fs::read_to_string(store.page_path("doc", 0)).unwrap();
        let parsed: PageData = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());
        assert!(!store.contains("doc", 0));

        store.save("doc", 0, &sample()).unwrap();
        assert!(store.contains("doc", 0));
        assert!(dir.path().join("doc").join("0.json").is_file());
        assert_eq!(store.load("doc", 0).unwrap(), sample());
    }

    #[test]
    fn test_fs_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());
        let err = store.load("doc", 7).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fs_persisted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());
        store.save("doc", 1, &sample()).unwrap();
        let raw = fs::read_to_string(store.page_path("doc", 1)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["boxes"]["signal"][0], serde_json::json!([10.0, 40.0, 700.0, 712.0]));
        assert_eq!(json["stems"]["signal"][0], "signal");
        assert_eq!(json["dimensions"]["origWidth"], 612.0);
    }

    struct CountingStore {
        inner: MemoryPageStore,
        loads: AtomicUsize,
    }

    impl PageStore for CountingStore {
        fn load(&self, document: &str, page: u32) -> Result<PageData> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(document, page)
        }

        fn save(&self, document: &str, page: u32, data: &PageData) -> Result<()> {
            self.inner.save(document, page, data)
        }
    }

    #[test]
    fn test_cache_reads_through_once() {
        let inner = CountingStore {
            inner: MemoryPageStore::new(),
            loads: AtomicUsize::new(0),
        };
        inner.inner.save("doc", 0, &sample()).unwrap();

        let cached = CachedPageStore::new(inner);
        assert_eq!(cached.load("doc", 0).unwrap(), sample());
        assert_eq!(cached.load("doc", 0).unwrap(), sample());
        assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cached_len(), 1);

        cached.clear();
        assert_eq!(cached.cached_len(), 0);
    }

    #[test]
    fn test_cache_does_not_store_misses() {
        let cached = CachedPageStore::new(MemoryPageStore::new());
        assert!(cached.load("doc", 0).unwrap_err().is_not_found());
        assert_eq!(cached.cached_len(), 0);
        cached.save("doc", 0, &sample()).unwrap();
        assert!(cached.contains("doc", 0));
    }

    #[test]
    fn test_open_store_honours_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::default().with_metadata_root(dir.path());
        open_store(&config).save("doc", 0, &sample()).unwrap();

        let uncached = open_store(&config.clone().with_cache_metadata(false));
        assert_eq!(uncached.load("doc", 0).unwrap(), sample());
        assert!(dir.path().join("doc").join("0.json").is_file());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPageStore::new();
        assert!(store.is_empty());
        store.save("doc", 2, &sample()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains("doc", 2));
        assert!(!store.contains("doc", 3));
    }
}
