//! Session state machine.
//!
//! The session turns user [`Intent`]s into filesystem and registry effects
//! and decides which screen comes next. Front ends only translate input into
//! intents and draw the [`View`] that comes back.

pub mod machine;
pub mod state;
pub mod view;

pub use machine::{is_valid_note_name, Session, NOTE_EXTENSION};
pub use state::{
    DeleteTarget, FileRow, Flow, Intent, StateKind, Status, StatusKind, VaultListRow, ViewState,
};
pub use view::{View, ViewBody};
