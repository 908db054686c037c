use relative_path::RelativePathBuf;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::models::ZoneBasedContent;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    NotFound(String),
    #[error("Invalid page id: {0:?}")]
    InvalidPageId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid content for page {page_id}: {source}")]
    Format {
        page_id: String,
        source: serde_json::Error,
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Where page content is loaded from and saved to
pub trait PageStore: Send + Sync {
    fn load(&self, page_id: &str) -> Result<ZoneBasedContent, StoreError>;
    fn save(&self, page_id: &str, content: &ZoneBasedContent) -> Result<(), StoreError>;
}

/// Stores each page as pretty-printed JSON at `<root>/<page_id>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a page id; ids may not be empty or contain path separators
    pub fn page_path(&self, page_id: &str) -> Result<PathBuf, StoreError> {
        if page_id.is_empty()
            || page_id.starts_with('.')
            || page_id.contains(['/', '\\'])
        {
            return Err(StoreError::InvalidPageId(page_id.to_string()));
        }
        Ok(RelativePathBuf::from(format!("{page_id}.json")).to_path(&self.root))
    }
}

impl PageStore for JsonFileStore {
    fn load(&self, page_id: &str) -> Result<ZoneBasedContent, StoreError> {
        let path = self.page_path(page_id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(page_id.to_string()));
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| StoreError::Format {
            page_id: page_id.to_string(),
            source,
        })
    }

    fn save(&self, page_id: &str, content: &ZoneBasedContent) -> Result<(), StoreError> {
        let path = self.page_path(page_id)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(content).map_err(|source| StoreError::Format {
            page_id: page_id.to_string(),
            source,
        })?;
        fs::write(&path, text)?;
        Ok(())
    }
}

/// In-process store, for hosts without durable storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<BTreeMap<String, ZoneBasedContent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page_id: impl Into<String>, content: ZoneBasedContent) -> Self {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_id.into(), content);
        self
    }

    /// Last saved content of a page
    pub fn page(&self, page_id: &str) -> Option<ZoneBasedContent> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(page_id)
            .cloned()
    }
}

impl PageStore for MemoryStore {
    fn load(&self, page_id: &str) -> Result<ZoneBasedContent, StoreError> {
        self.page(page_id)
            .ok_or_else(|| StoreError::NotFound(page_id.to_string()))
    }

    fn save(&self, page_id: &str, content: &ZoneBasedContent) -> Result<(), StoreError> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_id.to_string(), content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Zone};
    use crate::tests::{create_test_file, create_test_pages_dir};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample_content() -> ZoneBasedContent {
        ZoneBasedContent::new("with-sidebar").with_zone(
            Zone::from_id("main").with_blocks(vec![
                Block::new("b1", "core/paragraph").with_content("Hello"),
                Block::new("b2", "core/image").with_attribute("url", "/a.png"),
            ]),
        )
    }

    #[test]
    fn test_save_then_load_file() {
        let pages_dir = create_test_pages_dir();
        let store = JsonFileStore::new(pages_dir.path());

        store.save("home", &sample_content()).unwrap();
        let loaded = store.load("home").unwrap();

        assert_eq!(loaded, sample_content());
        assert!(pages_dir.path().join("home.json").exists());
    }

    #[test]
    fn test_save_creates_root_directory() {
        let pages_dir = create_test_pages_dir();
        let store = JsonFileStore::new(pages_dir.path().join("nested").join("pages"));

        store.save("about", &sample_content()).unwrap();

        assert!(store.root().join("about.json").is_file());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let pages_dir = create_test_pages_dir();
        let store = JsonFileStore::new(pages_dir.path());
        store.save("home", &sample_content()).unwrap();

        let replacement = ZoneBasedContent::new("single-column");
        store.save("home", &replacement).unwrap();

        assert_eq!(store.load("home").unwrap(), replacement);
    }

    #[test]
    fn test_load_missing_page() {
        let pages_dir = create_test_pages_dir();
        let store = JsonFileStore::new(pages_dir.path());

        let result = store.load("nope");

        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "nope"));
    }

    #[test]
    fn test_load_malformed_json() {
        let pages_dir = create_test_pages_dir();
        create_test_file(&pages_dir, "broken.json", "{ not json");
        let store = JsonFileStore::new(pages_dir.path());

        let result = store.load("broken");

        assert!(matches!(result, Err(StoreError::Format { .. })));
        assert!(result.unwrap_err().to_string().contains("broken"));
    }

    #[rstest]
    #[case("")]
    #[case("../escape")]
    #[case("a/b")]
    #[case("a\\b")]
    #[case(".hidden")]
    fn test_rejects_unsafe_page_ids(#[case] page_id: &str) {
        let store = JsonFileStore::new("/tmp/pages");

        assert!(matches!(
            store.page_path(page_id),
            Err(StoreError::InvalidPageId(_))
        ));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(matches!(store.load("home"), Err(StoreError::NotFound(_))));

        store.save("home", &sample_content()).unwrap();

        assert_eq!(store.load("home").unwrap(), sample_content());
        assert_eq!(store.page("home"), Some(sample_content()));
    }
}
