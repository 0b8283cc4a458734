//! Folder lifecycle: create, rename, move, delete, reorder.
//!
//! The backend has no rename primitive, so rename and move relocate the
//! directory by copying every file into the new location and removing the old
//! directory afterwards. The old directory is removed only when the copy was
//! complete. When some files could not be copied, both directories stay on
//! disk, the index points at the new location, and the returned
//! [`FolderRelocation`] says so; the leftover directory is an orphan to be
//! cleaned up by hand (the doctor report lists it).

use super::{LibraryStore, StorageBackend};
use crate::error::{ReelboxError, Result};
use crate::model::{
    unique_filename, unique_name, validate_entry_name, Folder, DEFAULT_FOLDER_COLOR,
    UNCATEGORIZED,
};
use crate::paths;
use std::collections::HashSet;
use tracing::warn;

/// Outcome of relocating a folder's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRelocation {
    pub files_copied: usize,
    /// Files that could not be copied, as `dir/name` paths relative to the root.
    pub failed: Vec<String>,
    pub old_directory_removed: bool,
}

impl Default for FolderRelocation {
    fn default() -> Self {
        Self {
            files_copied: 0,
            failed: Vec::new(),
            old_directory_removed: true,
        }
    }
}

impl FolderRelocation {
    /// True when nothing was left behind in the old directory.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.old_directory_removed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub folders_removed: usize,
    pub recordings_removed: usize,
    pub recordings_relocated: usize,
    pub folders_relocated: usize,
    /// Set when the folder stays in the index because some of its contents
    /// could not be moved out.
    pub folder_kept: bool,
    /// Individual failures that were logged and skipped.
    pub failures: Vec<String>,
}

impl<B: StorageBackend> LibraryStore<B> {
    pub fn create_folder(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> Result<Folder> {
        self.require_ready()?;
        validate_entry_name(name)?;
        let name = name.trim();
        let parent = self.resolve_folder(parent_id)?;

        if self.sibling_named(parent, name, None).is_some() {
            return Err(ReelboxError::NameConflict(name.to_string()));
        }

        // Directory first: a crash here leaves an orphan directory, never an
        // index entry without a directory.
        let mut path = self.folder_path(parent);
        path.push(name.to_string());
        self.backend.get_directory(&path, true)?;

        let mut folder = Folder::new(name, parent.map(str::to_string));
        folder.color = color.unwrap_or(DEFAULT_FOLDER_COLOR).to_string();
        folder.sort_order = self.data.child_folders(parent).len() as i64;
        self.data.folders.push(folder.clone());
        self.persist()?;
        Ok(folder)
    }

    pub fn rename_folder(&mut self, id: &str, new_name: &str) -> Result<FolderRelocation> {
        self.require_ready()?;
        validate_entry_name(new_name)?;
        let new_name = new_name.trim();
        let folder = self.folder(id)?.clone();
        if folder.name == new_name {
            return Ok(FolderRelocation::default());
        }

        let parent = folder.parent_id.as_deref();
        if self.sibling_named(parent, new_name, Some(id)).is_some() {
            return Err(ReelboxError::NameConflict(new_name.to_string()));
        }

        let old_path = self.folder_path(Some(id));
        let mut new_path = self.folder_path(parent);
        new_path.push(new_name.to_string());
        if self.directory_occupied(&new_path) {
            return Err(ReelboxError::NameConflict(new_name.to_string()));
        }

        let report = self.relocate_directory(&old_path, &new_path)?;
        if let Some(f) = self.data.folder_mut(id) {
            f.name = new_name.to_string();
        }
        self.persist()?;
        Ok(report)
    }

    pub fn move_folder(&mut self, id: &str, new_parent_id: Option<&str>) -> Result<FolderRelocation> {
        self.require_ready()?;
        let folder = self.folder(id)?.clone();
        let new_parent = self.resolve_folder(new_parent_id)?;

        if paths::would_create_cycle(id, new_parent, &self.data.folders) {
            return Err(ReelboxError::InvalidOperation(format!(
                "Cannot move folder '{}' into itself or one of its subfolders",
                folder.name
            )));
        }
        if folder.parent_id.as_deref() == new_parent {
            return Ok(FolderRelocation::default());
        }
        if self.sibling_named(new_parent, &folder.name, Some(id)).is_some() {
            return Err(ReelboxError::NameConflict(folder.name.clone()));
        }

        let old_path = self.folder_path(Some(id));
        let mut new_path = self.folder_path(new_parent);
        new_path.push(folder.name.clone());
        if self.directory_occupied(&new_path) {
            return Err(ReelboxError::NameConflict(folder.name.clone()));
        }

        let report = self.relocate_directory(&old_path, &new_path)?;
        let sort_order = self.data.child_folders(new_parent).len() as i64;
        if let Some(f) = self.data.folder_mut(id) {
            f.parent_id = new_parent.map(str::to_string);
            f.sort_order = sort_order;
        }
        self.persist()?;
        Ok(report)
    }

    /// Deletes a folder. With `delete_children` the whole subtree goes,
    /// including every recording in it and their crops. Without it, direct
    /// recordings and subfolders move up into the parent first; anything that
    /// cannot be moved stays where it is and the folder is kept for it.
    pub fn delete_folder(&mut self, id: &str, delete_children: bool) -> Result<DeleteReport> {
        self.require_ready()?;
        self.folder(id)?;
        let report = if delete_children {
            self.delete_folder_tree(id)
        } else {
            self.delete_folder_keep_contents(id)
        };
        self.persist()?;
        Ok(report)
    }

    /// Assigns `sort_order` to the folders under `parent_id` by their position
    /// in `ordered_ids`.
    pub fn reorder_folders(&mut self, parent_id: Option<&str>, ordered_ids: &[String]) -> Result<()> {
        self.require_ready()?;
        let parent = self.resolve_folder(parent_id)?;
        let mut folders = self.data.folders.clone();
        for (position, id) in ordered_ids.iter().enumerate() {
            let folder = folders
                .iter_mut()
                .find(|f| &f.id == id)
                .ok_or_else(|| ReelboxError::FolderNotFound(id.clone()))?;
            if folder.parent_id.as_deref() != parent {
                return Err(ReelboxError::InvalidOperation(format!(
                    "Folder '{}' is not in the folder being reordered",
                    folder.name
                )));
            }
            folder.sort_order = position as i64;
        }
        self.update_folders(folders)
    }

    // --- Delete modes ---

    fn delete_folder_tree(&mut self, id: &str) -> DeleteReport {
        let mut report = DeleteReport::default();
        let own_path = self.folder_path(Some(id));

        let mut subtree: HashSet<String> = paths::descendant_ids(id, &self.data.folders)
            .into_iter()
            .collect();
        subtree.insert(id.to_string());

        let mut doomed: Vec<String> = self
            .data
            .recordings
            .iter()
            .filter(|r| r.folder().is_some_and(|f| subtree.contains(f)))
            .map(|r| r.id.clone())
            .collect();
        self.extend_with_crops(&mut doomed);

        for rec_id in &doomed {
            let Some(rec) = self.data.recording(rec_id) else {
                continue;
            };
            if let Some(location) = self.locate_file(rec) {
                if let Err(e) = self.backend.delete_file(&location, &rec.filename) {
                    warn!(recording = %rec.id, error = %e, "Could not delete recording file");
                    report.failures.push(format!("{}: {}", rec.filename, e));
                }
            }
        }

        let doomed: HashSet<String> = doomed.into_iter().collect();
        let before = self.data.recordings.len();
        self.data.recordings.retain(|r| !doomed.contains(&r.id));
        report.recordings_removed = before - self.data.recordings.len();

        let before = self.data.folders.len();
        self.data.folders.retain(|f| !subtree.contains(&f.id));
        report.folders_removed = before - self.data.folders.len();

        if let Err(e) = self.backend.delete_directory(&own_path, true) {
            warn!(path = %own_path.join("/"), error = %e, "Could not remove folder directory");
            report.failures.push(format!("{}: {}", own_path.join("/"), e));
        }
        report
    }

    fn delete_folder_keep_contents(&mut self, id: &str) -> DeleteReport {
        let mut report = DeleteReport::default();
        let own_path = self.folder_path(Some(id));
        let parent = self
            .data
            .folder(id)
            .and_then(|f| f.parent_id.clone());
        let parent_path = self.folder_path(parent.as_deref());
        let mut stuck = false;

        // Direct recordings move up into the parent directory.
        let direct: Vec<String> = self
            .data
            .recordings_in(Some(id))
            .iter()
            .map(|r| r.id.clone())
            .collect();
        for rec_id in direct {
            let Some(rec) = self.data.recording(&rec_id).cloned() else {
                continue;
            };
            let filename = unique_filename(&rec.filename, |candidate| {
                self.filename_taken(parent.as_deref(), candidate, &rec.id)
            });
            let title = unique_name(&rec.display_title(), |candidate| {
                self.title_taken(parent.as_deref(), candidate, &rec.id)
            });

            match self.locate_file(&rec) {
                Some(location) => {
                    if let Err(e) = self.copy_file(&location, &rec.filename, &parent_path, &filename) {
                        // The index keeps pointing at the only copy.
                        warn!(recording = %rec.id, error = %e, "Could not move recording out of deleted folder");
                        report.failures.push(format!("{}: {}", rec.filename, e));
                        stuck = true;
                        continue;
                    }
                    if let Err(e) = self.backend.delete_file(&location, &rec.filename) {
                        warn!(recording = %rec.id, error = %e, "Could not remove original after move");
                        report.failures.push(format!("{}: {}", rec.filename, e));
                    }
                }
                None => warn!(recording = %rec.id, "Recording file missing, updating index only"),
            }

            if let Some(r) = self.data.recording_mut(&rec_id) {
                r.folder_id = parent.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
                r.filename = filename;
                if title != rec.display_title() {
                    r.tab_title = title;
                }
            }
            report.recordings_relocated += 1;
        }

        // Direct subfolders are re-parented, renamed if the parent already has
        // a folder by that name.
        let children: Vec<String> = self
            .data
            .child_folders(Some(id))
            .iter()
            .map(|f| f.id.clone())
            .collect();
        for child_id in children {
            let Some(child) = self.data.folder(&child_id).cloned() else {
                continue;
            };
            let name = unique_name(&child.name, |candidate| {
                self.sibling_named(parent.as_deref(), candidate, Some(id)).is_some()
                    || self.directory_occupied(&[parent_path.clone(), vec![candidate.to_string()]].concat())
            });
            let from = self.folder_path(Some(&child_id));
            let mut to = parent_path.clone();
            to.push(name.clone());

            match self.relocate_directory(&from, &to) {
                Ok(relocation) if relocation.failed.is_empty() => {
                    if !relocation.old_directory_removed {
                        report.failures.push(from.join("/"));
                    }
                }
                Ok(relocation) => {
                    // The subfolder stays put with every file it had; the
                    // partial copy is dropped.
                    warn!(folder = %child.id, failed = relocation.failed.len(), "Could not move subfolder out of deleted folder");
                    report.failures.extend(relocation.failed);
                    if let Err(e) = self.backend.delete_directory(&to, true) {
                        warn!(path = %to.join("/"), error = %e, "Partial copy left behind");
                    }
                    stuck = true;
                    continue;
                }
                Err(e) => {
                    warn!(folder = %child.id, error = %e, "Could not move subfolder out of deleted folder");
                    report.failures.push(format!("{}: {}", from.join("/"), e));
                    stuck = true;
                    continue;
                }
            }

            let sort_order = self.data.child_folders(parent.as_deref()).len() as i64;
            if let Some(f) = self.data.folder_mut(&child_id) {
                f.parent_id = parent.clone();
                f.name = name;
                f.sort_order = sort_order;
            }
            report.folders_relocated += 1;
        }

        if stuck {
            warn!(folder = %id, "Folder kept, some contents could not be moved out");
            report.folder_kept = true;
            return report;
        }

        self.data.folders.retain(|f| f.id != id);
        report.folders_removed = 1;

        if let Err(e) = self.backend.delete_directory(&own_path, false) {
            warn!(path = %own_path.join("/"), error = %e, "Folder directory left behind");
            report.failures.push(format!("{}: {}", own_path.join("/"), e));
        }
        report
    }

    // --- Helpers ---

    fn sibling_named(&self, parent: Option<&str>, name: &str, except_id: Option<&str>) -> Option<&Folder> {
        self.data
            .folders
            .iter()
            .find(|f| f.parent_id.as_deref() == parent && f.name == name && Some(f.id.as_str()) != except_id)
    }

    /// A directory that exists and has anything in it.
    fn directory_occupied(&self, path: &[String]) -> bool {
        self.backend
            .list_directory(path)
            .map(|listing| !listing.files.is_empty() || !listing.directories.is_empty())
            .unwrap_or(false)
    }

    /// Adds every crop (and crop of a crop) of the listed recordings.
    pub(crate) fn extend_with_crops(&self, ids: &mut Vec<String>) {
        let mut seen: HashSet<String> = ids.iter().cloned().collect();
        let mut cursor = 0;
        while cursor < ids.len() {
            let parent = ids[cursor].clone();
            for crop in self.data.crops_of(&parent) {
                if seen.insert(crop.id.clone()) {
                    ids.push(crop.id.clone());
                }
            }
            cursor += 1;
        }
    }

    pub(crate) fn copy_file(
        &self,
        from: &[String],
        from_name: &str,
        to: &[String],
        to_name: &str,
    ) -> Result<()> {
        let bytes = self
            .backend
            .read_file(from, from_name)?
            .ok_or_else(|| ReelboxError::FileNotFound(from_name.to_string()))?;
        self.backend.write_file(to, to_name, &bytes)
    }

    /// Copy-then-delete relocation of a whole directory tree. Only failing to
    /// create the destination is fatal; individual file failures are collected.
    fn relocate_directory(&self, from: &[String], to: &[String]) -> Result<FolderRelocation> {
        let mut report = FolderRelocation::default();
        if from == to {
            return Ok(report);
        }
        self.backend.get_directory(to, true)?;
        self.copy_tree(from, to, &mut report);

        if report.failed.is_empty() {
            if let Err(e) = self.backend.delete_directory(from, true) {
                warn!(path = %from.join("/"), error = %e, "Old folder directory could not be removed");
                report.old_directory_removed = false;
            }
        } else {
            warn!(
                path = %from.join("/"),
                failed = report.failed.len(),
                "Folder copy incomplete, old directory kept"
            );
            report.old_directory_removed = false;
        }
        Ok(report)
    }

    fn copy_tree(&self, from: &[String], to: &[String], report: &mut FolderRelocation) {
        let listing = match self.backend.list_directory(from) {
            Ok(listing) => listing,
            // Nothing on disk to carry over.
            Err(ReelboxError::FolderNotFound(_)) => return,
            Err(e) => {
                report.failed.push(format!("{}: {}", from.join("/"), e));
                return;
            }
        };

        for file in &listing.files {
            match self.copy_file(from, file, to, file) {
                Ok(()) => report.files_copied += 1,
                Err(e) => {
                    warn!(file = %file, error = %e, "Could not copy file");
                    report.failed.push([from.join("/"), file.clone()].join("/"));
                }
            }
        }

        for dir in &listing.directories {
            let sub_from = [from.to_vec(), vec![dir.clone()]].concat();
            let sub_to = [to.to_vec(), vec![dir.clone()]].concat();
            if let Err(e) = self.backend.get_directory(&sub_to, true) {
                report.failed.push(format!("{}: {}", sub_from.join("/"), e));
                continue;
            }
            self.copy_tree(&sub_from, &sub_to, report);
        }
    }
}
