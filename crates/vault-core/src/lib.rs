//! # Gono Core Library
//!
//! This crate holds everything behind the Gono notes manager that does not
//! touch the terminal.
//!
//! ## Overview
//!
//! A vault is a plain directory of Markdown notes. The core provides:
//!
//! - **Path Guard**: Containment checks that keep every operation inside the open vault
//! - **Vault Registry**: The persisted list of known vault roots, healed on read
//! - **Filesystem Gateway**: Listing, reading, writing, creating and deleting entries
//! - **Session**: The state machine that maps user intents to effects and screens
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Front end (TUI, tests)           │  keys -> Intent, View -> frame
//! ├─────────────────────────────────────────┤
//! │          Session state machine          │  one intent at a time
//! ├──────────────┬──────────────┬───────────┤
//! │  Path Guard  │   Registry   │  Gateway  │
//! └──────────────┴──────────────┴───────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vault_core::{FilesystemGateway, Flow, Intent, Session, UnavailablePicker, VaultRegistry};
//!
//! let home = std::path::PathBuf::from("/home/me");
//! let mut session = Session::new(
//!     VaultRegistry::new(home.join(".gono_vaults.json")),
//!     FilesystemGateway::new(),
//!     Box::new(UnavailablePicker),
//!     home,
//! );
//!
//! session.dispatch(Intent::CreateVault);
//! session.dispatch(Intent::Submit("Journal".to_string()));
//! println!("{}", session.view().title);
//!
//! assert_eq!(session.dispatch(Intent::Quit), Flow::Quit);
//! ```
//!
//! ## Modules
//!
//! - [`guard`]: Path resolution and containment
//! - [`registry`]: Vault registry persistence
//! - [`gateway`]: Filesystem operations
//! - [`picker`]: Folder picker capability
//! - [`session`]: State machine, intents and render payload
//! - [`error`]: Session error type

pub mod error;
pub mod gateway;
pub mod guard;
pub mod picker;
pub mod registry;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use gateway::{Entry, FilesystemGateway, GatewayError};
pub use picker::{FolderPicker, PickerError, PickerOutcome, UnavailablePicker};
pub use registry::{RegistryError, VaultRegistry};
pub use session::{
    is_valid_note_name, DeleteTarget, FileRow, Flow, Intent, Session, StateKind, Status,
    StatusKind, VaultListRow, View, ViewBody, ViewState, NOTE_EXTENSION,
};
