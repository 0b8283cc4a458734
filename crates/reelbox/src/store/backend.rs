use crate::error::Result;
use std::path::PathBuf;

/// Access state of the library root, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    /// Not granted yet, but asking the user may grant it.
    Prompt,
    Denied,
}

/// Entries directly inside one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

/// Abstract interface for raw storage I/O under the library root.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`super::LibraryStore`] handles the "what" (index, conflicts, drift).
/// Paths are sequences of directory names relative to the root; the empty
/// sequence is the root itself. Implementations hold no domain state.
///
/// There is no rename primitive: relocating a directory is
/// composed from copy and delete by the store.
pub trait StorageBackend {
    // --- Root & Permission ---

    /// Whether a library root has been chosen at all.
    fn root_selected(&self) -> bool;

    fn query_permission(&self) -> Permission;

    /// Ask for access. Backends without an interactive prompt just re-query.
    fn request_permission(&self) -> Permission;

    // --- Directories ---

    /// Ensures a directory exists. With `create = false` a missing directory
    /// is `FolderNotFound`; with `create = true` it is created (with parents).
    fn get_directory(&self, path: &[String], create: bool) -> Result<()>;

    fn list_directory(&self, path: &[String]) -> Result<DirListing>;

    fn delete_directory(&self, path: &[String], recursive: bool) -> Result<()>;

    // --- Files ---

    /// Write a whole file, replacing any previous content in one step.
    fn write_file(&self, path: &[String], filename: &str, bytes: &[u8]) -> Result<()>;

    /// Returns Ok(None) if the file does not exist.
    fn read_file(&self, path: &[String], filename: &str) -> Result<Option<Vec<u8>>>;

    /// Deleting an absent file succeeds.
    fn delete_file(&self, path: &[String], filename: &str) -> Result<()>;

    // --- Paths ---

    /// Where the file would live. For FsBackend the real path, for MemBackend
    /// a virtual one.
    fn locate(&self, path: &[String], filename: &str) -> PathBuf;

    fn file_exists(&self, path: &[String], filename: &str) -> bool {
        self.list_directory(path)
            .map(|listing| listing.files.iter().any(|f| f == filename))
            .unwrap_or(false)
    }
}
