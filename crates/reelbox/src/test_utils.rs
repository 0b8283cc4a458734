use crate::store::fs_backend::FsBackend;
use crate::store::LibraryStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Held so the directory outlives the store.
    pub _temp_dir: TempDir,
    pub store: LibraryStore<FsBackend>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// A ready store over a fresh library root in a temp dir.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("library");
        let mut store = LibraryStore::with_backend(FsBackend::new(Some(root.clone())));
        store.init().expect("failed to open test library");
        Self {
            _temp_dir: temp_dir,
            store,
            root,
        }
    }

    /// Reopens the library from disk, dropping all in-memory state.
    pub fn reopen(&mut self) {
        let mut store = LibraryStore::with_backend(FsBackend::new(Some(self.root.clone())));
        store.init().expect("failed to reopen test library");
        self.store = store;
    }
}
