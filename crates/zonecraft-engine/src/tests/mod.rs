use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use crate::io::{PageStore, StoreError};
use crate::models::{Block, Zone, ZoneBasedContent};

/// Create a temporary pages directory
pub fn create_test_pages_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content
pub fn create_test_file(pages_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = pages_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// `count` blocks of `block_type` with ids `<prefix>0..`
pub fn blocks_of(block_type: &str, count: usize) -> Vec<Block> {
    let prefix = block_type.rsplit('/').next().unwrap_or(block_type);
    (0..count)
        .map(|i| Block::new(format!("{prefix}-{i}"), block_type).with_content(format!("#{i}")))
        .collect()
}

pub fn paragraphs(count: usize) -> Vec<Block> {
    blocks_of("core/paragraph", count)
}

/// header [h1], main [m1, m2, m3], sidebar [s1], footer [f1]
pub fn sample_page() -> ZoneBasedContent {
    ZoneBasedContent::new("with-sidebar")
        .with_zone(Zone::from_id("header").with_blocks(vec![
            Block::new("h1", "core/heading").with_attribute("level", 1).with_content("Welcome"),
        ]))
        .with_zone(Zone::from_id("main").with_blocks(vec![
            Block::new("m1", "core/paragraph").with_content("One"),
            Block::new("m2", "core/paragraph").with_content("Two"),
            Block::new("m3", "core/paragraph").with_content("Three"),
        ]))
        .with_zone(Zone::from_id("sidebar").with_blocks(vec![
            Block::new("s1", "core/paragraph").with_content("Aside"),
        ]))
        .with_zone(Zone::from_id("footer").with_blocks(vec![
            Block::new("f1", "core/paragraph").with_content("Fine print"),
        ]))
}

/// Top-level block ids of a zone, in order
pub fn block_ids(content: &ZoneBasedContent, zone_id: &str) -> Vec<String> {
    content
        .zone(zone_id)
        .map(|zone| zone.blocks.iter().map(|b| b.id.clone()).collect())
        .unwrap_or_default()
}

/// Every block sequence in `content` is numbered exactly 0..n-1
pub fn assert_dense_order(content: &ZoneBasedContent) {
    for zone in content.zones.values() {
        assert_sequence_dense(&zone.blocks, &zone.id);
        for block in crate::models::walk_blocks(&zone.blocks) {
            assert_sequence_dense(block.children(), &block.id);
        }
    }
}

fn assert_sequence_dense(blocks: &[Block], parent: &str) {
    let orders: Vec<usize> = blocks.iter().map(|b| b.order).collect();
    let expected: Vec<usize> = (0..blocks.len()).collect();
    assert_eq!(orders, expected, "order of blocks under {parent}");
}

/// Poll `condition` until it holds or a couple of seconds pass
pub fn wait_for(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// A store that is always down
pub struct FailingStore;

impl PageStore for FailingStore {
    fn load(&self, _page_id: &str) -> Result<ZoneBasedContent, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn save(&self, _page_id: &str, _content: &ZoneBasedContent) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

/// Fails the first `n` saves, then succeeds
pub struct FlakyStore {
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl PageStore for FlakyStore {
    fn load(&self, page_id: &str) -> Result<ZoneBasedContent, StoreError> {
        Err(StoreError::NotFound(page_id.to_string()))
    }

    fn save(&self, _page_id: &str, _content: &ZoneBasedContent) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(StoreError::Unavailable(format!("attempt {attempt}")));
        }
        Ok(())
    }
}

#[derive(Default)]
struct Gate {
    entered: bool,
    released: bool,
    saved: Option<ZoneBasedContent>,
}

/// A store whose saves block until the test releases them
#[derive(Default)]
pub struct GatedStore {
    gate: Mutex<Gate>,
    changed: Condvar,
}

impl GatedStore {
    /// Block until a save has started
    pub fn wait_until_entered(&self) {
        let mut gate = self.gate.lock().unwrap();
        while !gate.entered {
            gate = self.changed.wait(gate).unwrap();
        }
    }

    pub fn release(&self) {
        self.gate.lock().unwrap().released = true;
        self.changed.notify_all();
    }

    pub fn saved(&self) -> Option<ZoneBasedContent> {
        self.gate.lock().unwrap().saved.clone()
    }
}

impl PageStore for GatedStore {
    fn load(&self, page_id: &str) -> Result<ZoneBasedContent, StoreError> {
        Err(StoreError::NotFound(page_id.to_string()))
    }

    fn save(&self, _page_id: &str, content: &ZoneBasedContent) -> Result<(), StoreError> {
        let mut gate = self.gate.lock().unwrap();
        gate.entered = true;
        self.changed.notify_all();
        while !gate.released {
            gate = self.changed.wait(gate).unwrap();
        }
        gate.saved = Some(content.clone());
        Ok(())
    }
}
