//! # reelbox
//!
//! reelbox keeps a personal library of captured audio recordings on disk. It
//! is a library that happens to have a CLI client (`reelbox-cli`); nothing in
//! this crate writes to stdout or assumes a terminal.
//!
//! ## Layout on Disk
//!
//! The library root mirrors the folder tree as real directories, so the files
//! stay browsable with any file manager. Everything that cannot be expressed
//! as a directory (crop lineage, ratings, tags, ordering) lives in one JSON
//! index at the root.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                         │
//! │  - LibraryStore: the only mutator of LibraryData          │
//! │  - folder and recording lifecycle, fallback search        │
//! └───────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌────────────────┐  ┌──────────────────┐  ┌─────────────────┐
//! │ paths.rs       │  │ index.rs         │  │ StorageBackend  │
//! │ folder → dir   │  │ library.json     │  │ FsBackend       │
//! │ cycle guards   │  │ load/save/dedupe │  │ MemBackend      │
//! └────────────────┘  └──────────────────┘  └─────────────────┘
//! ```
//!
//! The [`migration`] module imports a legacy flat store through the public
//! store operations, and [`init`] wires config, backend, store and migration
//! together for a client.
//!
//! ## Module Overview
//!
//! - [`model`]: `Folder`, `Recording`, `LibraryData` and naming helpers
//! - [`paths`]: pure path resolution over the folder list
//! - [`index`]: the `library.json` document
//! - [`store`]: `LibraryStore` and the storage backends
//! - [`migration`]: legacy import
//! - [`config`] / [`init`]: configuration and bootstrap
//! - [`error`]: `ReelboxError`

pub mod config;
pub mod error;
pub mod index;
pub mod init;
pub mod migration;
pub mod model;
pub mod paths;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use error::{ReelboxError, Result};
pub use model::{Folder, LibraryData, Recording, RecordingPatch, UNCATEGORIZED};
pub use store::LibraryStore;
