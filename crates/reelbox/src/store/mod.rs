//! # Storage Layer
//!
//! [`LibraryStore`] is the sole owner and mutator of the live [`LibraryData`]
//! for one opened library root. It turns logical operations into index
//! mutations plus physical directory/file work delegated to a
//! [`StorageBackend`].
//!
//! ## Two Sources of Truth
//!
//! reelbox maintains a split model:
//! 1. **Structure**: the JSON index (`library.json`) holds the folder tree,
//!    crop lineage and every piece of metadata.
//! 2. **Bytes**: the directory tree under the root holds the audio files, laid
//!    out to mirror the folder tree.
//!
//! The two can drift apart when a multi-step operation is interrupted. The
//! store does not try to roll back; it keeps going where it can, reports what
//! it could not do, and finds drifted files with a **fallback search**
//! (expected directory, then the root, then every known folder directory).
//! The scan is linear in the number of folders, which is fine at the scale of
//! a personal library. A directory where another recording with the same
//! filename belongs is skipped, so the search never hands out a file some
//! other recording owns.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──init──▶ Initializing ──▶ Ready ──close──▶ Closed
//!                              │
//!                              ├──▶ NeedsFolder      (no root chosen)
//!                              └──▶ NeedsPermission  (access not granted)
//! ```
//!
//! Every operation other than the lifecycle methods requires `Ready`.
//!
//! ## Write-Through
//!
//! Each mutating operation persists the index before returning. There is no
//! separate save step. A failure to persist is surfaced as a hard error; per
//! item file failures inside recursive operations are logged and reported.
//!
//! ## Operations
//!
//! - Folder lifecycle: see `folders.rs`
//! - Recording lifecycle and fallback search: see `recordings.rs`
//! - Drift report: see `doctor.rs`
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: Production backend over `std::fs`.
//! - [`mem_backend::MemBackend`]: For testing logic without filesystem I/O.

use crate::error::{ReelboxError, Result};
use crate::index;
use crate::model::{is_uncategorized, Folder, LibraryData, Recording};
use crate::paths;
use std::collections::HashSet;
use tracing::{debug, info};

pub mod backend;
pub mod doctor;
pub mod folders;
pub mod fs_backend;
pub mod mem_backend;
pub mod recordings;

pub use backend::{DirListing, Permission, StorageBackend};
pub use doctor::DoctorReport;
pub use folders::{DeleteReport, FolderRelocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Initializing,
    Ready,
    NeedsFolder,
    NeedsPermission,
    Closed,
}

pub struct LibraryStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    pub(crate) data: LibraryData,
    state: StoreState,
}

impl<B: StorageBackend> LibraryStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            data: LibraryData::default(),
            state: StoreState::Uninitialized,
        }
    }

    /// Opens the library: checks the root and access to it, then loads (or
    /// creates) the index and removes duplicate entries.
    pub fn init(&mut self) -> Result<()> {
        if self.state == StoreState::Ready {
            return Ok(());
        }
        self.state = StoreState::Initializing;

        if !self.backend.root_selected() {
            self.state = StoreState::NeedsFolder;
            return Err(ReelboxError::NoRootSelected);
        }

        let permission = match self.backend.query_permission() {
            Permission::Prompt => self.backend.request_permission(),
            granted_or_denied => granted_or_denied,
        };
        match permission {
            Permission::Granted => {}
            Permission::Prompt => {
                self.state = StoreState::NeedsPermission;
                return Err(ReelboxError::PermissionPromptNeeded);
            }
            Permission::Denied => {
                self.state = StoreState::NeedsPermission;
                return Err(ReelboxError::PermissionDenied);
            }
        }

        let loaded = index::load_deduplicated(&self.backend).and_then(|(data, existed)| {
            if !existed {
                index::save(&self.backend, &data)?;
            }
            Ok(data)
        });
        match loaded {
            Ok(data) => {
                info!(
                    folders = data.folders.len(),
                    recordings = data.recordings.len(),
                    "Library ready"
                );
                self.data = data;
                self.state = StoreState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = StoreState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Releases the in-memory index. The store can be opened again with `init`.
    pub fn close(&mut self) {
        self.data = LibraryData::default();
        self.state = StoreState::Closed;
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn data(&self) -> &LibraryData {
        &self.data
    }

    pub fn folders(&self) -> &[Folder] {
        &self.data.folders
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.data.recordings
    }

    pub fn folder(&self, id: &str) -> Result<&Folder> {
        self.data
            .folder(id)
            .ok_or_else(|| ReelboxError::FolderNotFound(id.to_string()))
    }

    pub fn recording(&self, id: &str) -> Result<&Recording> {
        self.data
            .recording(id)
            .ok_or_else(|| ReelboxError::RecordingNotFound(id.to_string()))
    }

    pub fn folder_path(&self, folder_id: Option<&str>) -> Vec<String> {
        paths::folder_path(folder_id, &self.data.folders)
    }

    pub fn recording_path(&self, recording: &Recording) -> Vec<String> {
        paths::recording_path(recording, &self.data.folders)
    }

    /// The folder whose disk path is exactly `path`.
    pub fn find_folder_by_path(&self, path: &[String]) -> Option<&Folder> {
        if path.is_empty() {
            return None;
        }
        self.data
            .folders
            .iter()
            .find(|f| self.folder_path(Some(&f.id)) == path)
    }

    // --- Internal helpers shared by the operation modules ---

    pub(crate) fn require_ready(&self) -> Result<()> {
        if self.state == StoreState::Ready {
            Ok(())
        } else {
            Err(ReelboxError::InvalidOperation(format!(
                "Library is not ready ({:?})",
                self.state
            )))
        }
    }

    pub(crate) fn persist(&self) -> Result<()> {
        index::save(&self.backend, &self.data)
    }

    /// `None` for the root, `Some(id)` for an existing folder.
    pub(crate) fn resolve_folder<'a>(&self, folder_id: Option<&'a str>) -> Result<Option<&'a str>> {
        if is_uncategorized(folder_id) {
            return Ok(None);
        }
        let id = folder_id.unwrap_or_default();
        if self.data.folder(id).is_none() {
            return Err(ReelboxError::FolderNotFound(id.to_string()));
        }
        Ok(Some(id))
    }

    /// Rejects a title or filename already used by another recording in the folder.
    pub(crate) fn check_recording_names(
        &self,
        folder_id: Option<&str>,
        title: &str,
        filename: &str,
        except_id: &str,
    ) -> Result<()> {
        for other in self.data.recordings_in(folder_id) {
            if other.id == except_id {
                continue;
            }
            if other.display_title() == title {
                return Err(ReelboxError::NameConflict(title.to_string()));
            }
            if other.filename == filename {
                return Err(ReelboxError::NameConflict(filename.to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn title_taken(&self, folder_id: Option<&str>, title: &str, except_id: &str) -> bool {
        self.data
            .recordings_in(folder_id)
            .iter()
            .any(|r| r.id != except_id && r.display_title() == title)
    }

    /// Taken by another recording in the folder, or by a stray file on disk.
    pub(crate) fn filename_taken(
        &self,
        folder_id: Option<&str>,
        filename: &str,
        except_id: &str,
    ) -> bool {
        let claimed = self
            .data
            .recordings_in(folder_id)
            .iter()
            .any(|r| r.id != except_id && r.filename == filename);
        claimed || {
            let own_file = self
                .data
                .recording(except_id)
                .is_some_and(|r| r.folder() == folder_id && r.filename == filename);
            !own_file
                && self
                    .backend
                    .file_exists(&self.folder_path(folder_id), filename)
        }
    }

    /// Fallback search: the expected directory first, then the root, then
    /// every known folder directory. A file in another directory that some
    /// other recording legitimately owns is never returned.
    pub(crate) fn locate_file(&self, recording: &Recording) -> Option<Vec<String>> {
        let expected = self.recording_path(recording);
        if self.backend.file_exists(&expected, &recording.filename) {
            return Some(expected);
        }

        let claimed: HashSet<Vec<String>> = self
            .data
            .recordings
            .iter()
            .filter(|r| r.id != recording.id && r.filename == recording.filename)
            .map(|r| self.recording_path(r))
            .collect();

        let mut tried: HashSet<Vec<String>> = HashSet::new();
        tried.insert(expected.clone());
        let candidates = std::iter::once(Vec::new()).chain(
            self.data
                .folders
                .iter()
                .map(|f| self.folder_path(Some(&f.id))),
        );

        for candidate in candidates {
            if !tried.insert(candidate.clone()) || claimed.contains(&candidate) {
                continue;
            }
            if self.backend.file_exists(&candidate, &recording.filename) {
                debug!(
                    recording = %recording.id,
                    expected = %expected.join("/"),
                    found = %candidate.join("/"),
                    "Recording file found by fallback search"
                );
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn test_init_creates_index_on_fresh_root() {
        let mut store = LibraryStore::with_backend(MemBackend::new());
        assert_eq!(store.state(), StoreState::Uninitialized);
        store.init().unwrap();
        assert_eq!(store.state(), StoreState::Ready);
        assert!(store.backend.has_file(&[], index::INDEX_FILE));
    }

    #[test]
    fn test_init_without_root_needs_folder() {
        let mut store = LibraryStore::with_backend(MemBackend::without_root());
        let err = store.init().unwrap_err();
        assert!(matches!(err, ReelboxError::NoRootSelected));
        assert!(err.needs_root_selection());
        assert_eq!(store.state(), StoreState::NeedsFolder);
    }

    #[test]
    fn test_init_permission_states() {
        let backend = MemBackend::new();
        backend.set_permission(Permission::Prompt);
        let mut store = LibraryStore::with_backend(backend);
        assert!(matches!(
            store.init(),
            Err(ReelboxError::PermissionPromptNeeded)
        ));
        assert_eq!(store.state(), StoreState::NeedsPermission);

        store.backend.set_grant_on_request(true);
        store.init().unwrap();
        assert!(store.is_ready());

        let backend = MemBackend::new();
        backend.set_permission(Permission::Denied);
        let mut store = LibraryStore::with_backend(backend);
        assert!(matches!(store.init(), Err(ReelboxError::PermissionDenied)));
        assert_eq!(store.state(), StoreState::NeedsPermission);
    }

    #[test]
    fn test_init_fails_on_corrupt_index() {
        let backend = MemBackend::new();
        backend.write_file(&[], index::INDEX_FILE, b"[[[").unwrap();
        let mut store = LibraryStore::with_backend(backend);
        assert!(matches!(store.init(), Err(ReelboxError::ReadFailed(_))));
        assert!(!store.is_ready());
    }

    #[test]
    fn test_operations_require_ready() {
        let mut store = LibraryStore::with_backend(MemBackend::new());
        let result = store.create_folder("Beats", None, None);
        assert!(matches!(result, Err(ReelboxError::InvalidOperation(_))));

        store.init().unwrap();
        store.close();
        assert_eq!(store.state(), StoreState::Closed);
        assert!(store.create_folder("Beats", None, None).is_err());
    }

    #[test]
    fn test_reopen_after_close_reloads_index() {
        let mut store = LibraryStore::with_backend(MemBackend::new());
        store.init().unwrap();
        store.create_folder("Beats", None, None).unwrap();
        store.close();
        assert!(store.folders().is_empty());

        store.init().unwrap();
        assert_eq!(store.folders().len(), 1);
    }

    #[test]
    fn test_fs_library_survives_reopen() {
        use crate::model::Recording;
        use crate::test_utils::TestEnv;

        let mut env = TestEnv::new();
        let beats = env.store.create_folder("Beats", None, None).unwrap();
        let rec = env
            .store
            .save_recording(Recording::new("a.webm", "a").in_folder(beats.id.clone()), b"abc")
            .unwrap();
        assert!(env.root.join("Beats").join("a.webm").is_file());

        env.reopen();
        assert_eq!(env.store.folders().len(), 1);
        assert_eq!(env.store.get_recording_blob(&rec.id).unwrap(), b"abc");
    }
}
