//! Mutating page content.
//!
//! [`ContentEditor`] owns one page's content for an editing session and
//! applies block and zone operations to it. Edits are not validated here;
//! gate them with [`ConstraintQuery`](crate::query::ConstraintQuery) first
//! and run [`validate`](crate::validation::validate) before publishing.
//!
//! [`SharedEditor`] wraps an editor for use from several threads and adds
//! skip-if-busy saving, which [`AutoSave`] drives on a timer.

mod autosave;
mod editor;
mod patch;
mod shared;

pub use autosave::AutoSave;
pub use editor::ContentEditor;
pub use patch::{BlockPatch, ZonePatch};
pub use shared::{SaveOutcome, SharedEditor};
