use super::backend::{DirListing, Permission, StorageBackend};
use crate::error::{ReelboxError, Result};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

/// A library root held in memory, with switches for the failures a real
/// directory handle can produce: an unselected root, a permission prompt or
/// denial, and writes or deletes that fail for chosen filenames.
pub struct MemBackend {
    directories: RefCell<BTreeSet<Vec<String>>>,
    files: RefCell<BTreeMap<(Vec<String>, String), Vec<u8>>>,
    root_selected: Cell<bool>,
    permission: Cell<Permission>,
    grant_on_request: Cell<bool>,
    simulate_write_error: Cell<bool>,
    failing_writes: RefCell<HashSet<String>>,
    failing_deletes: RefCell<HashSet<String>>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            directories: RefCell::new(BTreeSet::new()),
            files: RefCell::new(BTreeMap::new()),
            root_selected: Cell::new(true),
            permission: Cell::new(Permission::Granted),
            grant_on_request: Cell::new(false),
            simulate_write_error: Cell::new(false),
            failing_writes: RefCell::new(HashSet::new()),
            failing_deletes: RefCell::new(HashSet::new()),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend for which no library folder was ever chosen.
    pub fn without_root() -> Self {
        let backend = Self::default();
        backend.root_selected.set(false);
        backend
    }

    pub fn set_permission(&self, permission: Permission) {
        self.permission.set(permission);
    }

    /// Make `request_permission` grant access, like a user accepting a prompt.
    pub fn set_grant_on_request(&self, grant: bool) {
        self.grant_on_request.set(grant);
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Fail every write of a file with this name, anywhere.
    pub fn fail_writes_to(&self, filename: &str) {
        self.failing_writes.borrow_mut().insert(filename.to_string());
    }

    /// Fail every delete of a file with this name, and recursive deletes of
    /// any directory containing it.
    pub fn fail_deletes_of(&self, filename: &str) {
        self.failing_deletes.borrow_mut().insert(filename.to_string());
    }

    pub fn has_directory(&self, path: &[&str]) -> bool {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        key.is_empty() || self.directories.borrow().contains(&key)
    }

    pub fn has_file(&self, path: &[&str], filename: &str) -> bool {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.files
            .borrow()
            .contains_key(&(key, filename.to_string()))
    }

    fn ensure_parents(&self, path: &[String]) {
        let mut dirs = self.directories.borrow_mut();
        for depth in 1..=path.len() {
            dirs.insert(path[..depth].to_vec());
        }
    }

    fn dir_exists(&self, path: &[String]) -> bool {
        path.is_empty() || self.directories.borrow().contains(path)
    }
}

fn is_within(candidate: &[String], dir: &[String]) -> bool {
    candidate.len() >= dir.len() && candidate[..dir.len()] == *dir
}

impl StorageBackend for MemBackend {
    fn root_selected(&self) -> bool {
        self.root_selected.get()
    }

    fn query_permission(&self) -> Permission {
        self.permission.get()
    }

    fn request_permission(&self) -> Permission {
        if self.grant_on_request.get() && self.permission.get() == Permission::Prompt {
            self.permission.set(Permission::Granted);
        }
        self.permission.get()
    }

    fn get_directory(&self, path: &[String], create: bool) -> Result<()> {
        if self.dir_exists(path) {
            return Ok(());
        }
        if !create {
            return Err(ReelboxError::FolderNotFound(path.join("/")));
        }
        if self.simulate_write_error.get() {
            return Err(ReelboxError::WriteFailed("Simulated write error".to_string()));
        }
        self.ensure_parents(path);
        Ok(())
    }

    fn list_directory(&self, path: &[String]) -> Result<DirListing> {
        if !self.dir_exists(path) {
            return Err(ReelboxError::FolderNotFound(path.join("/")));
        }
        let files = self
            .files
            .borrow()
            .keys()
            .filter(|(dir, _)| dir.as_slice() == path)
            .map(|(_, name)| name.clone())
            .collect();
        let directories = self
            .directories
            .borrow()
            .iter()
            .filter(|dir| dir.len() == path.len() + 1 && is_within(dir, path))
            .map(|dir| dir[path.len()].clone())
            .collect();
        Ok(DirListing { files, directories })
    }

    fn delete_directory(&self, path: &[String], recursive: bool) -> Result<()> {
        if path.is_empty() {
            return Err(ReelboxError::InvalidOperation(
                "Refusing to delete the library root".to_string(),
            ));
        }
        if !self.dir_exists(path) {
            return Ok(());
        }
        let has_content = self.files.borrow().keys().any(|(dir, _)| is_within(dir, path))
            || self
                .directories
                .borrow()
                .iter()
                .any(|dir| dir.len() > path.len() && is_within(dir, path));
        if has_content && !recursive {
            return Err(ReelboxError::DeleteFailed(format!(
                "Directory not empty: {}",
                path.join("/")
            )));
        }
        let blocked = self.files.borrow().keys().any(|(dir, name)| {
            is_within(dir, path) && self.failing_deletes.borrow().contains(name)
        });
        if blocked {
            return Err(ReelboxError::DeleteFailed(format!(
                "Simulated delete error in {}",
                path.join("/")
            )));
        }
        self.files
            .borrow_mut()
            .retain(|(dir, _), _| !is_within(dir, path));
        self.directories
            .borrow_mut()
            .retain(|dir| !is_within(dir, path));
        Ok(())
    }

    fn write_file(&self, path: &[String], filename: &str, bytes: &[u8]) -> Result<()> {
        if self.simulate_write_error.get() || self.failing_writes.borrow().contains(filename) {
            return Err(ReelboxError::WriteFailed("Simulated write error".to_string()));
        }
        self.ensure_parents(path);
        self.files
            .borrow_mut()
            .insert((path.to_vec(), filename.to_string()), bytes.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &[String], filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .files
            .borrow()
            .get(&(path.to_vec(), filename.to_string()))
            .cloned())
    }

    fn delete_file(&self, path: &[String], filename: &str) -> Result<()> {
        if self.failing_deletes.borrow().contains(filename) {
            return Err(ReelboxError::DeleteFailed(format!(
                "Simulated delete error: {}",
                filename
            )));
        }
        self.files
            .borrow_mut()
            .remove(&(path.to_vec(), filename.to_string()));
        Ok(())
    }

    fn locate(&self, path: &[String], filename: &str) -> PathBuf {
        let mut located = PathBuf::from("memory://");
        for segment in path {
            located.push(segment);
        }
        located.join(filename)
    }
}
