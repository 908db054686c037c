use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::editing::{SaveOutcome, SharedEditor};
use crate::io::PageStore;

/// Periodic background save for a [`SharedEditor`].
///
/// Every `interval` the worker saves if the editor is dirty and no other save
/// is in flight. Failures are logged and retried on the next tick. Stopping
/// (or dropping) cancels the timer; a save already in progress finishes on
/// its own.
pub struct AutoSave {
    stop: Option<Sender<()>>,
}

impl AutoSave {
    pub fn start<S>(editor: SharedEditor<S>, interval: Duration) -> std::io::Result<Self>
    where
        S: PageStore + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("zonecraft-autosave".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    match editor.save_if_dirty() {
                        Ok(SaveOutcome::Saved) => log::debug!("Auto-save completed"),
                        Ok(SaveOutcome::Clean) => {}
                        Ok(SaveOutcome::Busy) => {
                            log::debug!("Auto-save skipped, a save is already running")
                        }
                        Err(e) => log::warn!("Auto-save failed: {e}"),
                    }
                }
                log::debug!("Auto-save stopped");
            })?;

        Ok(Self {
            stop: Some(stop_tx),
        })
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    /// Cancel future saves
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The worker may already be gone; nothing to cancel then
            let _ = stop.send(());
        }
    }
}

impl Drop for AutoSave {
    fn drop(&mut self) {
        self.stop();
    }
}
