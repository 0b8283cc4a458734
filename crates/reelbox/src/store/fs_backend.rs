use super::backend::{DirListing, Permission, StorageBackend};
use crate::error::{ReelboxError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend rooted at the chosen library directory.
pub struct FsBackend {
    root: Option<PathBuf>,
}

impl FsBackend {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn root_dir(&self) -> Result<&Path> {
        self.root.as_deref().ok_or(ReelboxError::NoRootSelected)
    }

    fn dir(&self, path: &[String]) -> Result<PathBuf> {
        let mut dir = self.root_dir()?.to_path_buf();
        for segment in path {
            check_segment(segment)?;
            dir.push(segment);
        }
        Ok(dir)
    }

    fn file(&self, path: &[String], filename: &str) -> Result<PathBuf> {
        check_segment(filename)?;
        Ok(self.dir(path)?.join(filename))
    }
}

/// Rejects segments that would escape the root or address something other
/// than a single entry.
fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
    {
        return Err(ReelboxError::InvalidOperation(format!(
            "Invalid path segment: '{}'",
            segment
        )));
    }
    Ok(())
}

fn is_tmp_artifact(name: &str) -> bool {
    name.starts_with(".reelbox-") && name.ends_with(".tmp")
}

impl StorageBackend for FsBackend {
    fn root_selected(&self) -> bool {
        self.root.is_some()
    }

    fn query_permission(&self) -> Permission {
        let Some(root) = self.root.as_deref() else {
            return Permission::Denied;
        };
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {
                if meta.permissions().readonly() {
                    Permission::Denied
                } else {
                    Permission::Granted
                }
            }
            Ok(_) => Permission::Denied,
            // A root that is not there yet can be created on request.
            Err(e) if e.kind() == ErrorKind::NotFound => Permission::Prompt,
            Err(_) => Permission::Denied,
        }
    }

    fn request_permission(&self) -> Permission {
        if let Some(root) = self.root.as_deref() {
            if !root.exists() && fs::create_dir_all(root).is_err() {
                return Permission::Denied;
            }
        }
        self.query_permission()
    }

    fn get_directory(&self, path: &[String], create: bool) -> Result<()> {
        let dir = self.dir(path)?;
        if dir.is_dir() {
            return Ok(());
        }
        if !create {
            return Err(ReelboxError::FolderNotFound(path.join("/")));
        }
        fs::create_dir_all(&dir)
            .map_err(|e| ReelboxError::WriteFailed(format!("{}: {}", dir.display(), e)))
    }

    fn list_directory(&self, path: &[String]) -> Result<DirListing> {
        let dir = self.dir(path)?;
        let entries = fs::read_dir(&dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReelboxError::FolderNotFound(path.join("/")),
            _ => ReelboxError::ReadFailed(format!("{}: {}", dir.display(), e)),
        })?;

        let mut listing = DirListing::default();
        for entry in entries {
            let entry = entry.map_err(ReelboxError::Io)?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let file_type = entry.file_type().map_err(ReelboxError::Io)?;
            if file_type.is_dir() {
                listing.directories.push(name);
            } else if file_type.is_file() && !is_tmp_artifact(&name) {
                listing.files.push(name);
            }
        }
        listing.files.sort();
        listing.directories.sort();
        Ok(listing)
    }

    fn delete_directory(&self, path: &[String], recursive: bool) -> Result<()> {
        if path.is_empty() {
            return Err(ReelboxError::InvalidOperation(
                "Refusing to delete the library root".to_string(),
            ));
        }
        let dir = self.dir(path)?;
        let result = if recursive {
            fs::remove_dir_all(&dir)
        } else {
            fs::remove_dir(&dir)
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReelboxError::DeleteFailed(format!(
                "{}: {}",
                dir.display(),
                e
            ))),
        }
    }

    fn write_file(&self, path: &[String], filename: &str, bytes: &[u8]) -> Result<()> {
        let target = self.file(path, filename)?;
        let dir = self.dir(path)?;
        fs::create_dir_all(&dir)
            .map_err(|e| ReelboxError::WriteFailed(format!("{}: {}", dir.display(), e)))?;

        // Atomic Write
        let tmp = dir.join(format!(".reelbox-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes)
            .map_err(|e| ReelboxError::WriteFailed(format!("{}: {}", target.display(), e)))?;
        fs::rename(&tmp, &target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ReelboxError::WriteFailed(format!("{}: {}", target.display(), e))
        })
    }

    fn read_file(&self, path: &[String], filename: &str) -> Result<Option<Vec<u8>>> {
        let target = self.file(path, filename)?;
        match fs::read(&target) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ReelboxError::ReadFailed(format!(
                "{}: {}",
                target.display(),
                e
            ))),
        }
    }

    fn delete_file(&self, path: &[String], filename: &str) -> Result<()> {
        let target = self.file(path, filename)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReelboxError::DeleteFailed(format!(
                "{}: {}",
                target.display(),
                e
            ))),
        }
    }

    fn locate(&self, path: &[String], filename: &str) -> PathBuf {
        let mut located = self.root.clone().unwrap_or_default();
        for segment in path {
            located.push(segment);
        }
        located.join(filename)
    }

    fn file_exists(&self, path: &[String], filename: &str) -> bool {
        self.file(path, filename)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }
}
