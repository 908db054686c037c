use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::constraints::ZoneConfig;
use crate::editing::shared::SaveGuard;
use crate::editing::{BlockPatch, SaveOutcome, ZonePatch};
use crate::io::{PageStore, StoreError};
use crate::models::{Block, Zone, ZoneBasedContent, find_block_mut, renumber, renumber_tree};

/// Owns one page's content during an editing session.
///
/// Every mutation goes through `&mut self`, so a single owner serializes
/// edits by construction; use [`SharedEditor`](crate::editing::SharedEditor)
/// to share one editor across threads.
///
/// Operations that name an unknown zone or block are no-ops and return
/// `false` (or `None`). After every operation, each block sequence it
/// touched and every sequence nested inside an inserted or replaced block
/// is numbered exactly `0..n-1`.
///
/// The editor keeps the last loaded or saved content as a baseline;
/// [`is_dirty`](Self::is_dirty) is structural inequality between the two.
pub struct ContentEditor<S> {
    store: Arc<S>,
    page_id: String,
    content: ZoneBasedContent,
    baseline: ZoneBasedContent,
    dirty: bool,
    saving: Arc<AtomicBool>,
}

impl<S: PageStore> ContentEditor<S> {
    /// Start a session from `content`, which also becomes the clean baseline
    pub fn new(store: Arc<S>, page_id: impl Into<String>, content: ZoneBasedContent) -> Self {
        Self {
            store,
            page_id: page_id.into(),
            baseline: content.clone(),
            content,
            dirty: false,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn load(store: Arc<S>, page_id: impl Into<String>) -> Result<Self, StoreError> {
        let page_id = page_id.into();
        let content = store.load(&page_id)?;
        log::info!("Loaded page {page_id} ({} zones)", content.zones.len());
        Ok(Self::new(store, page_id, content))
    }

    /// Load the page, or start from the layout template when the store has
    /// never seen it. Unknown layouts start from empty content.
    pub fn open(
        store: Arc<S>,
        page_id: impl Into<String>,
        config: &ZoneConfig,
        layout_id: &str,
    ) -> Result<Self, StoreError> {
        let page_id = page_id.into();
        match store.load(&page_id) {
            Ok(content) => Ok(Self::new(store, page_id, content)),
            Err(StoreError::NotFound(_)) => {
                log::info!("Page {page_id} not found, starting from layout {layout_id}");
                let content = ZoneBasedContent::from_layout(config, layout_id)
                    .unwrap_or_else(|| ZoneBasedContent::new(layout_id));
                Ok(Self::new(store, page_id, content))
            }
            Err(e) => Err(e),
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn content(&self) -> &ZoneBasedContent {
        &self.content
    }

    pub fn baseline(&self) -> &ZoneBasedContent {
        &self.baseline
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Shallow-merge `patch` into a zone. No validation is performed.
    pub fn update_zone(&mut self, zone_id: &str, patch: ZonePatch) -> bool {
        self.edit_zone(zone_id, "update_zone", |zone| {
            patch.apply_to(zone);
            true
        })
    }

    /// Insert at `position` (clamped to the zone length), or append
    pub fn add_block(&mut self, zone_id: &str, block: Block, position: Option<usize>) -> bool {
        self.edit_zone(zone_id, "add_block", |zone| {
            insert_block(zone, block, position);
            true
        })
    }

    /// Merge `patch` into the block with `block_id`, nested blocks included
    pub fn update_block(&mut self, zone_id: &str, block_id: &str, patch: BlockPatch) -> bool {
        self.edit_zone(zone_id, "update_block", |zone| {
            match find_block_mut(&mut zone.blocks, block_id) {
                Some(block) => {
                    patch.apply_to(block);
                    true
                }
                None => false,
            }
        })
    }

    pub fn remove_block(&mut self, zone_id: &str, block_id: &str) -> bool {
        self.edit_zone(zone_id, "remove_block", |zone| {
            take_block(zone, block_id).is_some()
        })
    }

    /// Move a top-level block to `to_zone_id` at `position` (clamped), or to
    /// the end. Moving within one zone repositions the block.
    pub fn move_block(
        &mut self,
        from_zone_id: &str,
        to_zone_id: &str,
        block_id: &str,
        position: Option<usize>,
    ) -> bool {
        if !self.content.zones.contains_key(to_zone_id) {
            log::debug!("move_block: unknown target zone {to_zone_id}");
            return false;
        }
        let Some(block) = self
            .content
            .zone_mut(from_zone_id)
            .and_then(|zone| take_block(zone, block_id))
        else {
            log::debug!("move_block: block {block_id} not found in zone {from_zone_id}");
            return false;
        };
        if let Some(target) = self.content.zone_mut(to_zone_id) {
            insert_block(target, block, position);
        }
        self.refresh_dirty();
        true
    }

    /// Replace the zone's blocks with those named by `ordered_ids`, in that
    /// order. Ids that match no block are ignored; blocks not named are dropped.
    pub fn reorder_blocks<I, T>(&mut self, zone_id: &str, ordered_ids: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.edit_zone(zone_id, "reorder_blocks", |zone| {
            let mut remaining = std::mem::take(&mut zone.blocks);
            for id in ordered_ids {
                if let Some(index) = remaining.iter().position(|b| b.id == id.as_ref()) {
                    zone.blocks.push(remaining.swap_remove(index));
                }
            }
            if !remaining.is_empty() {
                log::debug!(
                    "reorder_blocks: dropped {} unnamed blocks from zone {}",
                    remaining.len(),
                    zone.id
                );
            }
            renumber(&mut zone.blocks);
            true
        })
    }

    /// Copy a top-level block (with fresh ids throughout) directly after the
    /// original. Returns the copy's id.
    pub fn duplicate_block(&mut self, zone_id: &str, block_id: &str) -> Option<String> {
        let mut new_id = None;
        self.edit_zone(zone_id, "duplicate_block", |zone| {
            let Some(index) = zone.position_of(block_id) else {
                return false;
            };
            let mut copy = zone.blocks[index].duplicate_with_fresh_ids();
            renumber_tree(std::slice::from_mut(&mut copy));
            new_id = Some(copy.id.clone());
            zone.blocks.insert(index + 1, copy);
            renumber(&mut zone.blocks);
            true
        });
        new_id
    }

    /// Persist the current content. On success it becomes the new baseline;
    /// on failure the editor stays dirty and the error is returned.
    ///
    /// Shares the skip-if-busy flag with any [`SharedEditor`] wrapping this
    /// editor, so a save started here while another is in flight returns
    /// [`SaveOutcome::Busy`] without writing.
    ///
    /// [`SharedEditor`]: crate::editing::SharedEditor
    pub fn save(&mut self) -> Result<SaveOutcome, StoreError> {
        let saving = Arc::clone(&self.saving);
        let Some(_guard) = SaveGuard::acquire(&saving) else {
            log::debug!("Save of page {} skipped, a save is already running", self.page_id);
            return Ok(SaveOutcome::Busy);
        };
        let snapshot = self.content.clone();
        self.store.save(&self.page_id, &snapshot)?;
        log::info!("Saved page {}", self.page_id);
        self.commit_baseline(snapshot);
        Ok(SaveOutcome::Saved)
    }

    /// Replace content and baseline with what the store currently holds
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let content = self.store.load(&self.page_id)?;
        self.baseline = content.clone();
        self.content = content;
        self.dirty = false;
        Ok(())
    }

    /// Discard every change since the last load or save
    pub fn reset_changes(&mut self) {
        self.content = self.baseline.clone();
        self.dirty = false;
    }

    pub(crate) fn saving_flag(&self) -> &Arc<AtomicBool> {
        &self.saving
    }

    /// Record `saved` as the persisted state. Edits made after `saved` was
    /// taken keep the editor dirty.
    pub(crate) fn commit_baseline(&mut self, saved: ZoneBasedContent) {
        self.baseline = saved;
        self.refresh_dirty();
    }

    fn edit_zone(
        &mut self,
        zone_id: &str,
        operation: &str,
        edit: impl FnOnce(&mut Zone) -> bool,
    ) -> bool {
        let Some(zone) = self.content.zone_mut(zone_id) else {
            log::debug!("{operation}: unknown zone {zone_id}");
            return false;
        };
        if !edit(zone) {
            log::debug!("{operation}: nothing to change in zone {zone_id}");
            return false;
        }
        self.refresh_dirty();
        true
    }

    fn refresh_dirty(&mut self) {
        self.dirty = self.content != self.baseline;
    }
}

fn insert_block(zone: &mut Zone, block: Block, position: Option<usize>) {
    let len = zone.blocks.len();
    let index = position.map_or(len, |p| p.min(len));
    zone.blocks.insert(index, block);
    renumber(&mut zone.blocks);
    renumber_tree(std::slice::from_mut(&mut zone.blocks[index]));
}

fn take_block(zone: &mut Zone, block_id: &str) -> Option<Block> {
    let index = zone.position_of(block_id)?;
    let block = zone.blocks.remove(index);
    renumber(&mut zone.blocks);
    Some(block)
}
