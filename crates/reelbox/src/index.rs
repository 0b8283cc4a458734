//! # Library Index
//!
//! The index is one JSON document, `library.json`, at the root of the library.
//! It is the only durable record of the logical structure: folder tree, crop
//! lineage, ratings, tags, notes. The directory tree itself carries nothing but
//! file bytes and names.
//!
//! ```text
//! <root>/
//! ├── library.json        # {version, exportedAt, recordings, folders}
//! ├── loose-take.webm     # uncategorized recordings
//! └── Beats/
//!     └── Trap/
//!         └── 808 idea.webm
//! ```
//!
//! ## Loading
//!
//! A missing document means a fresh library; the caller starts from an empty
//! [`LibraryData`]. A document that exists but does not parse is a hard
//! `ReadFailed`: resetting it would throw away the whole folder structure even
//! though every file is still on disk.
//!
//! ## De-duplication
//!
//! Interrupted bulk saves have produced duplicate recording entries in the
//! past. Every load collapses entries sharing an id (first occurrence wins)
//! and, if anything was dropped, writes the cleaned document straight back.

use crate::error::{ReelboxError, Result};
use crate::model::{Folder, LibraryData, Recording};
use crate::store::backend::StorageBackend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

pub const INDEX_FILE: &str = "library.json";
pub const INDEX_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexDocument {
    version: u32,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    recordings: Vec<Recording>,
    #[serde(default)]
    folders: Vec<Folder>,
}

/// Reads the index document. `Ok(None)` when the library has no index yet.
pub fn load<B: StorageBackend>(backend: &B) -> Result<Option<LibraryData>> {
    let Some(bytes) = backend.read_file(&[], INDEX_FILE)? else {
        return Ok(None);
    };
    let doc: IndexDocument = serde_json::from_slice(&bytes)
        .map_err(|e| ReelboxError::ReadFailed(format!("Malformed {}: {}", INDEX_FILE, e)))?;
    Ok(Some(LibraryData {
        version: doc.version,
        recordings: doc.recordings,
        folders: doc.folders,
    }))
}

/// Writes the whole document in a single backend write.
pub fn save<B: StorageBackend>(backend: &B, data: &LibraryData) -> Result<()> {
    let doc = IndexDocument {
        version: INDEX_VERSION,
        exported_at: Some(Utc::now()),
        recordings: data.recordings.clone(),
        folders: data.folders.clone(),
    };
    let content = serde_json::to_vec_pretty(&doc)
        .map_err(|e| ReelboxError::WriteFailed(format!("Cannot encode index: {}", e)))?;
    backend.write_file(&[], INDEX_FILE, &content)
}

/// Loads the index and removes duplicate entries, persisting the cleaned
/// document when anything was dropped. A missing index yields an empty library.
pub fn load_deduplicated<B: StorageBackend>(backend: &B) -> Result<(LibraryData, bool)> {
    let Some(mut data) = load(backend)? else {
        return Ok((
            LibraryData {
                version: INDEX_VERSION,
                ..Default::default()
            },
            false,
        ));
    };

    let dropped_recordings = dedupe_recordings(&mut data.recordings);
    let dropped_folders = dedupe_folders(&mut data.folders);
    if dropped_recordings + dropped_folders > 0 {
        warn!(
            dropped_recordings,
            dropped_folders, "Removed duplicate entries from {}", INDEX_FILE
        );
        save(backend, &data)?;
    }
    data.version = INDEX_VERSION;
    Ok((data, true))
}

/// Keeps the first recording for each id. Returns how many were dropped.
pub fn dedupe_recordings(recordings: &mut Vec<Recording>) -> usize {
    let before = recordings.len();
    let mut seen = HashSet::new();
    recordings.retain(|r| seen.insert(r.id.clone()));
    before - recordings.len()
}

/// Keeps the first folder for each id. Returns how many were dropped.
pub fn dedupe_folders(folders: &mut Vec<Folder>) -> usize {
    let before = folders.len();
    let mut seen = HashSet::new();
    folders.retain(|f| seen.insert(f.id.clone()));
    before - folders.len()
}
