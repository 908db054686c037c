use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::editing::ContentEditor;
use crate::io::{PageStore, StoreError};

/// What a save attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing to save
    Clean,
    /// Another save was in flight; this one was skipped
    Busy,
}

struct Shared<S> {
    editor: Mutex<ContentEditor<S>>,
    store: Arc<S>,
    page_id: String,
    saving: Arc<AtomicBool>,
}

/// Thread-safe handle to one [`ContentEditor`].
///
/// Mutations run under a mutex, so back-to-back calls from any thread apply
/// in lock order. Saves snapshot the content under the lock and write it
/// outside the lock, so editing is never blocked on store I/O. Overlapping
/// saves are skipped rather than queued.
pub struct SharedEditor<S> {
    inner: Arc<Shared<S>>,
}

impl<S> Clone for SharedEditor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PageStore> SharedEditor<S> {
    pub fn new(editor: ContentEditor<S>) -> Self {
        let store = Arc::clone(editor.store());
        let page_id = editor.page_id().to_string();
        let saving = Arc::clone(editor.saving_flag());
        Self {
            inner: Arc::new(Shared {
                editor: Mutex::new(editor),
                store,
                page_id,
                saving,
            }),
        }
    }

    /// Run `f` with exclusive access to the editor.
    ///
    /// Prefer [`save`](Self::save) over calling the editor's own `save` here:
    /// both respect the busy flag, but the editor's holds the lock for the
    /// whole write.
    pub fn with_editor<R>(&self, f: impl FnOnce(&mut ContentEditor<S>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.inner.saving.load(Ordering::Acquire)
    }

    /// Save now unless another save is already running
    pub fn save(&self) -> Result<SaveOutcome, StoreError> {
        let Some(_guard) = SaveGuard::acquire(&self.inner.saving) else {
            return Ok(SaveOutcome::Busy);
        };

        let snapshot = self.lock().content().clone();
        self.inner.store.save(&self.inner.page_id, &snapshot)?;
        self.lock().commit_baseline(snapshot);
        log::info!("Saved page {}", self.inner.page_id);
        Ok(SaveOutcome::Saved)
    }

    /// Save only when there are unsaved changes
    pub fn save_if_dirty(&self) -> Result<SaveOutcome, StoreError> {
        if !self.is_dirty() {
            return Ok(SaveOutcome::Clean);
        }
        self.save()
    }

    fn lock(&self) -> MutexGuard<'_, ContentEditor<S>> {
        self.inner
            .editor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the saving flag for one save; clears it when the save finishes,
/// successfully or not
pub(crate) struct SaveGuard<'a>(&'a AtomicBool);

impl<'a> SaveGuard<'a> {
    /// `None` when another save already holds the flag
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;
    use crate::models::Block;
    use crate::tests::{FailingStore, GatedStore, assert_dense_order, sample_page};
    use pretty_assertions::assert_eq;
    use std::thread;

    fn shared(store: MemoryStore) -> (Arc<MemoryStore>, SharedEditor<MemoryStore>) {
        let store = Arc::new(store);
        let editor = ContentEditor::new(store.clone(), "home", sample_page());
        (store, SharedEditor::new(editor))
    }

    #[test]
    fn test_save_if_dirty_skips_clean_editor() {
        let (store, editor) = shared(MemoryStore::new());

        assert_eq!(editor.save_if_dirty().unwrap(), SaveOutcome::Clean);
        assert!(store.page("home").is_none());
    }

    #[test]
    fn test_save_persists_and_cleans() {
        let (store, editor) = shared(MemoryStore::new());
        editor.with_editor(|e| e.remove_block("main", "m1"));

        assert_eq!(editor.save_if_dirty().unwrap(), SaveOutcome::Saved);

        assert!(!editor.is_dirty());
        assert_eq!(
            store.page("home"),
            Some(editor.with_editor(|e| e.content().clone()))
        );
    }

    #[test]
    fn test_failed_save_keeps_dirty_and_releases_flag() {
        let editor =
            SharedEditor::new(ContentEditor::new(Arc::new(FailingStore), "home", sample_page()));
        editor.with_editor(|e| e.remove_block("main", "m1"));

        assert!(editor.save().is_err());

        assert!(editor.is_dirty());
        assert!(!editor.is_saving());
    }

    #[test]
    fn test_inner_editor_save_is_skipped_while_shared_save_runs() {
        let gate = Arc::new(GatedStore::default());
        let editor = SharedEditor::new(ContentEditor::new(gate.clone(), "home", sample_page()));
        editor.with_editor(|e| e.remove_block("main", "m1"));

        let saver = {
            let editor = editor.clone();
            thread::spawn(move || editor.save())
        };
        gate.wait_until_entered();

        assert_eq!(editor.with_editor(|e| e.save()).unwrap(), SaveOutcome::Busy);

        gate.release();
        assert_eq!(saver.join().unwrap().unwrap(), SaveOutcome::Saved);
        assert!(!editor.is_saving());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_concurrent_mutations_serialize() {
        let (_store, editor) = shared(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let editor = editor.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let block = Block::new(format!("w{worker}-{i}"), "core/paragraph");
                        editor.with_editor(|e| e.add_block("footer", block, Some(0)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        editor.with_editor(|e| {
            assert_eq!(e.content().block_count("footer"), 1 + 8 * 25);
            assert_dense_order(e.content());
        });
    }

    #[test]
    fn test_overlapping_save_is_skipped_and_edits_during_save_stay_dirty() {
        let gate = Arc::new(GatedStore::default());
        let editor = SharedEditor::new(ContentEditor::new(gate.clone(), "home", sample_page()));
        editor.with_editor(|e| e.remove_block("main", "m1"));

        let saver = {
            let editor = editor.clone();
            thread::spawn(move || editor.save())
        };
        gate.wait_until_entered();

        assert!(editor.is_saving());
        assert_eq!(editor.save().unwrap(), SaveOutcome::Busy);
        editor.with_editor(|e| e.remove_block("main", "m2"));

        gate.release();
        assert_eq!(saver.join().unwrap().unwrap(), SaveOutcome::Saved);

        assert!(!editor.is_saving());
        assert!(editor.is_dirty());
        let saved = gate.saved().unwrap();
        let main = saved.zone("main").unwrap();
        assert!(main.block("m1").is_none());
        assert!(main.block("m2").is_some());
    }
}
