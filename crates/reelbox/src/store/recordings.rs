//! Recording lifecycle: save, delete, move, rename, metadata edits, bulk
//! replace and blob reads.
//!
//! Every operation that needs the physical file goes through the fallback
//! search ([`LibraryStore::locate_file`]), so a file left in the wrong
//! directory by an interrupted operation is still found, moved and deleted.
//!
//! Titles and filenames are unique per folder. Every path that places a
//! recording into a folder or changes its title or filename checks this and
//! fails with `NameConflict`; the caller is expected to offer a rename
//! (`move_recording_with_rename`).

use super::{LibraryStore, StorageBackend};
use crate::error::{ReelboxError, Result};
use crate::index;
use crate::model::{
    file_extension, filename_for_title, unique_filename, validate_entry_name, Folder, Recording,
    RecordingPatch, MAX_RATING, UNCATEGORIZED,
};
use crate::paths;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::warn;

fn check_rating(rating: Option<u8>) -> Result<()> {
    match rating {
        Some(r) if r > MAX_RATING => Err(ReelboxError::InvalidOperation(format!(
            "Rating must be between 0 and {}",
            MAX_RATING
        ))),
        _ => Ok(()),
    }
}

impl<B: StorageBackend> LibraryStore<B> {
    /// Writes the file into the recording's folder directory and adds or
    /// replaces the index entry.
    pub fn save_recording(&mut self, mut recording: Recording, bytes: &[u8]) -> Result<Recording> {
        self.require_ready()?;
        validate_entry_name(&recording.filename)?;
        check_rating(recording.rating)?;

        let folder = self.resolve_folder(Some(&recording.folder_id))?.map(str::to_string);
        recording.folder_id = folder.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());

        if let Some(parent_id) = recording.parent_id.as_deref() {
            if parent_id == recording.id || self.data.recording(parent_id).is_none() {
                return Err(ReelboxError::RecordingNotFound(parent_id.to_string()));
            }
        }

        self.check_recording_names(
            folder.as_deref(),
            &recording.display_title(),
            &recording.filename,
            &recording.id,
        )?;
        if self.filename_taken(folder.as_deref(), &recording.filename, &recording.id) {
            return Err(ReelboxError::NameConflict(recording.filename.clone()));
        }

        let path = self.folder_path(folder.as_deref());
        let previous = self.data.recording(&recording.id).cloned();
        let previous_location = previous
            .as_ref()
            .and_then(|prev| self.locate_file(prev).map(|loc| (loc, prev.filename.clone())));

        self.backend.write_file(&path, &recording.filename, bytes)?;
        recording.size = bytes.len() as u64;

        if let Some((old_path, old_name)) = previous_location {
            if old_path != path || old_name != recording.filename {
                if let Err(e) = self.backend.delete_file(&old_path, &old_name) {
                    warn!(recording = %recording.id, error = %e, "Could not remove replaced file");
                }
            }
        }

        match self.data.recording_mut(&recording.id) {
            Some(existing) => *existing = recording.clone(),
            None => self.data.recordings.push(recording.clone()),
        }
        self.persist()?;
        Ok(recording)
    }

    /// Deletes a recording and its file. A file that is already gone is not an
    /// error. Crops are deleted too with `delete_children`, otherwise they are
    /// detached and survive as independent recordings.
    pub fn delete_recording(&mut self, id: &str, delete_children: bool) -> Result<()> {
        self.require_ready()?;
        let recording = self.recording(id)?.clone();

        if let Some(location) = self.locate_file(&recording) {
            self.backend.delete_file(&location, &recording.filename)?;
        }

        let mut doomed = vec![recording.id.clone()];
        if delete_children {
            self.extend_with_crops(&mut doomed);
            for crop_id in doomed.iter().skip(1) {
                let Some(crop) = self.data.recording(crop_id) else {
                    continue;
                };
                if let Some(location) = self.locate_file(crop) {
                    if let Err(e) = self.backend.delete_file(&location, &crop.filename) {
                        warn!(recording = %crop.id, error = %e, "Could not delete crop file");
                    }
                }
            }
        } else {
            for crop in self.data.recordings.iter_mut() {
                if crop.parent_id.as_deref() == Some(id) {
                    crop.parent_id = None;
                }
            }
        }

        let doomed: HashSet<String> = doomed.into_iter().collect();
        self.data.recordings.retain(|r| !doomed.contains(&r.id));
        self.persist()
    }

    /// Moves a recording into another folder (`None` or the sentinel for the
    /// root). Moving a crop to a different folder detaches it from its parent.
    pub fn move_recording(&mut self, id: &str, folder_id: Option<&str>) -> Result<Recording> {
        self.relocate_recording(id, folder_id, None)
    }

    /// Like [`Self::move_recording`], also giving the recording a new title.
    /// The filename is re-derived from the title.
    pub fn move_recording_with_rename(
        &mut self,
        id: &str,
        folder_id: Option<&str>,
        new_title: &str,
    ) -> Result<Recording> {
        self.relocate_recording(id, folder_id, Some(new_title))
    }

    /// Renames the file of a recording within its folder.
    pub fn rename_recording(&mut self, id: &str, new_filename: &str) -> Result<Recording> {
        self.require_ready()?;
        validate_entry_name(new_filename)?;
        let new_filename = new_filename.trim();
        let recording = self.recording(id)?.clone();
        if recording.filename == new_filename {
            return Ok(recording);
        }

        let mut renamed = recording.clone();
        renamed.filename = new_filename.to_string();
        self.check_recording_names(
            recording.folder(),
            &renamed.display_title(),
            new_filename,
            id,
        )?;
        if self.filename_taken(recording.folder(), new_filename, id) {
            return Err(ReelboxError::NameConflict(new_filename.to_string()));
        }

        let path = self.recording_path(&recording);
        match self.locate_file(&recording) {
            Some(location) => {
                self.copy_file(&location, &recording.filename, &path, new_filename)?;
                if let Err(e) = self.backend.delete_file(&location, &recording.filename) {
                    warn!(recording = %id, error = %e, "Old file left behind after rename");
                }
            }
            None => warn!(recording = %id, "Recording file missing, renaming index entry only"),
        }

        if let Some(r) = self.data.recording_mut(id) {
            r.filename = renamed.filename.clone();
        }
        self.persist()?;
        Ok(renamed)
    }

    /// Applies a metadata patch. A new title must be unique in the folder.
    pub fn update_recording(&mut self, id: &str, patch: RecordingPatch) -> Result<Recording> {
        self.require_ready()?;
        let mut updated = self.recording(id)?.clone();

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ReelboxError::InvalidOperation(
                    "Title cannot be empty".to_string(),
                ));
            }
            if self.title_taken(updated.folder(), &title, id) {
                return Err(ReelboxError::NameConflict(title));
            }
            updated.tab_title = title;
        }
        if let Some(rating) = patch.rating {
            check_rating(rating)?;
            updated.rating = rating;
        }
        if let Some(bpm) = patch.bpm {
            updated.bpm = bpm;
        }
        if let Some(tags) = patch.tags {
            updated.tags = tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(color) = patch.color {
            updated.color = color;
        }
        if let Some(notes) = patch.notes {
            updated.notes = notes;
        }
        if let Some(key) = patch.key {
            updated.key = key;
        }

        if let Some(r) = self.data.recording_mut(id) {
            *r = updated.clone();
        }
        self.persist()?;
        Ok(updated)
    }

    /// Replaces the whole recording list (used for reordering). Duplicate ids
    /// are collapsed, first occurrence wins. One index write for the batch.
    pub fn update_recordings(&mut self, mut recordings: Vec<Recording>) -> Result<()> {
        self.require_ready()?;
        let dropped = index::dedupe_recordings(&mut recordings);
        if dropped > 0 {
            warn!(dropped, "Dropped duplicate recordings from bulk update");
        }
        self.data.recordings = recordings;
        self.persist()
    }

    /// Replaces the whole folder list. Rejected if it contains a parent cycle.
    pub fn update_folders(&mut self, mut folders: Vec<Folder>) -> Result<()> {
        self.require_ready()?;
        let dropped = index::dedupe_folders(&mut folders);
        if dropped > 0 {
            warn!(dropped, "Dropped duplicate folders from bulk update");
        }
        if paths::has_cycle(&folders) {
            return Err(ReelboxError::InvalidOperation(
                "Folder list contains a cycle".to_string(),
            ));
        }
        self.data.folders = folders;
        self.persist()
    }

    /// Puts the listed recordings in the given order, keeping every other
    /// recording where it is.
    pub fn reorder_recordings(&mut self, ordered_ids: &[String]) -> Result<()> {
        self.require_ready()?;
        let mut seen = HashSet::new();
        if let Some(repeated) = ordered_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(ReelboxError::InvalidOperation(format!(
                "Recording '{}' is listed more than once",
                repeated
            )));
        }
        let mut slots = Vec::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            let slot = self
                .data
                .recordings
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| ReelboxError::RecordingNotFound(id.clone()))?;
            slots.push(slot);
        }
        let moved: Vec<Recording> = slots
            .iter()
            .map(|&slot| self.data.recordings[slot].clone())
            .collect();
        slots.sort_unstable();

        let mut recordings = self.data.recordings.clone();
        for (slot, recording) in slots.into_iter().zip(moved) {
            recordings[slot] = recording;
        }
        self.update_recordings(recordings)
    }

    /// Reads the audio bytes, searching beyond the expected directory if needed.
    pub fn get_recording_blob(&self, id: &str) -> Result<Vec<u8>> {
        self.require_ready()?;
        let recording = self.recording(id)?;
        let location = self
            .locate_file(recording)
            .ok_or_else(|| ReelboxError::FileNotFound(recording.filename.clone()))?;
        self.backend
            .read_file(&location, &recording.filename)?
            .ok_or_else(|| ReelboxError::FileNotFound(recording.filename.clone()))
    }

    /// The real path of a recording's file, found by the fallback search.
    pub fn recording_location(&self, id: &str) -> Result<PathBuf> {
        self.require_ready()?;
        let recording = self.recording(id)?;
        let location = self
            .locate_file(recording)
            .ok_or_else(|| ReelboxError::FileNotFound(recording.filename.clone()))?;
        Ok(self.backend.locate(&location, &recording.filename))
    }

    fn relocate_recording(
        &mut self,
        id: &str,
        folder_id: Option<&str>,
        new_title: Option<&str>,
    ) -> Result<Recording> {
        self.require_ready()?;
        let recording = self.recording(id)?.clone();
        let dest = self.resolve_folder(folder_id)?;
        let folder_changed = recording.folder() != dest;

        let title = match new_title {
            Some(t) if t.trim().is_empty() => {
                return Err(ReelboxError::InvalidOperation(
                    "Title cannot be empty".to_string(),
                ))
            }
            Some(t) => t.trim().to_string(),
            None => recording.display_title(),
        };
        if !folder_changed && new_title.is_none() {
            return Ok(recording);
        }

        if self.title_taken(dest, &title, id) {
            return Err(ReelboxError::NameConflict(title));
        }
        let filename = match new_title {
            Some(_) => {
                let derived = filename_for_title(&title, file_extension(&recording.filename));
                unique_filename(&derived, |candidate| self.filename_taken(dest, candidate, id))
            }
            None => {
                if self.filename_taken(dest, &recording.filename, id) {
                    return Err(ReelboxError::NameConflict(recording.filename.clone()));
                }
                recording.filename.clone()
            }
        };

        let dest_path = self.folder_path(dest);
        match self.locate_file(&recording) {
            Some(location) => {
                // The destination write must succeed before anything else changes.
                self.copy_file(&location, &recording.filename, &dest_path, &filename)?;
                if location != dest_path || recording.filename != filename {
                    if let Err(e) = self.backend.delete_file(&location, &recording.filename) {
                        warn!(recording = %id, error = %e, "Source file left behind after move");
                    }
                }
            }
            None => warn!(recording = %id, "Recording file missing, moving index entry only"),
        }

        let mut moved = recording;
        moved.folder_id = dest.unwrap_or(UNCATEGORIZED).to_string();
        moved.filename = filename;
        if folder_changed {
            moved.parent_id = None;
        }
        if new_title.is_some() {
            moved.tab_title = title;
        }
        if let Some(r) = self.data.recording_mut(id) {
            *r = moved.clone();
        }
        self.persist()?;
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use std::collections::BTreeSet;

    fn ready_store() -> LibraryStore<MemBackend> {
        let mut store = LibraryStore::with_backend(MemBackend::new());
        store.init().unwrap();
        store
    }

    fn save(store: &mut LibraryStore<MemBackend>, title: &str, folder: Option<&str>) -> Recording {
        let rec = Recording::new(format!("{}.webm", title), title)
            .in_folder(folder.unwrap_or(UNCATEGORIZED));
        store.save_recording(rec, title.as_bytes()).unwrap()
    }

    #[test]
    fn test_save_writes_file_under_folder_path() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        let trap = store.create_folder("Trap", Some(&beats.id), None).unwrap();
        let rec = save(&mut store, "R1", Some(&trap.id));

        assert!(store.backend.has_file(&["Beats", "Trap"], "R1.webm"));
        assert_eq!(rec.size, 2);
        assert_eq!(store.recordings().len(), 1);
    }

    #[test]
    fn test_save_replaces_existing_entry_and_file() {
        let mut store = ready_store();
        let mut rec = save(&mut store, "take", None);
        rec.filename = "take-v2.webm".to_string();
        store.save_recording(rec.clone(), b"v2").unwrap();

        assert_eq!(store.recordings().len(), 1);
        assert!(!store.backend.has_file(&[], "take.webm"));
        assert_eq!(store.get_recording_blob(&rec.id).unwrap(), b"v2");
    }

    #[test]
    fn test_save_rejects_conflicts_and_unknown_targets() {
        let mut store = ready_store();
        save(&mut store, "take", None);

        let clash = Recording::new("other.webm", "take");
        assert!(matches!(
            store.save_recording(clash, b"x"),
            Err(ReelboxError::NameConflict(_))
        ));

        let orphan_crop = Recording::new("crop.webm", "crop").cropped_from("nope");
        assert!(matches!(
            store.save_recording(orphan_crop, b"x"),
            Err(ReelboxError::RecordingNotFound(_))
        ));

        let lost = Recording::new("lost.webm", "lost").in_folder("nope");
        assert!(matches!(
            store.save_recording(lost, b"x"),
            Err(ReelboxError::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_save_fails_on_write_error() {
        let mut store = ready_store();
        store.backend.set_simulate_write_error(true);
        let result = store.save_recording(Recording::new("a.webm", "A"), b"x");
        assert!(result.is_err());
        store.backend.set_simulate_write_error(false);
        assert!(store.recordings().is_empty());
    }

    #[test]
    fn test_delete_missing_file_is_not_an_error() {
        let mut store = ready_store();
        let rec = save(&mut store, "gone", None);
        store.backend.delete_file(&[], &rec.filename).unwrap();

        store.delete_recording(&rec.id, false).unwrap();
        assert!(store.recordings().is_empty());
    }

    #[test]
    fn test_delete_detaches_or_deletes_crops() {
        let mut store = ready_store();
        let parent = save(&mut store, "full", None);
        let crop = store
            .save_recording(
                Recording::new("cut.webm", "cut").cropped_from(parent.id.clone()),
                b"c",
            )
            .unwrap();

        store.delete_recording(&parent.id, false).unwrap();
        let survivor = store.recording(&crop.id).unwrap();
        assert!(survivor.parent_id.is_none());

        let parent = save(&mut store, "full2", None);
        let crop = store
            .save_recording(
                Recording::new("cut2.webm", "cut2").cropped_from(parent.id.clone()),
                b"c",
            )
            .unwrap();
        let grandchild = store
            .save_recording(
                Recording::new("cut3.webm", "cut3").cropped_from(crop.id.clone()),
                b"c",
            )
            .unwrap();
        store.delete_recording(&parent.id, true).unwrap();
        assert!(store.recording(&crop.id).is_err());
        assert!(store.recording(&grandchild.id).is_err());
        assert!(!store.backend.has_file(&[], "cut2.webm"));
        assert!(!store.backend.has_file(&[], "cut3.webm"));
    }

    #[test]
    fn test_move_name_conflict_then_move_with_rename() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        save(&mut store, "Loop", Some(&beats.id));
        let rec = save(&mut store, "Loop", None);

        let err = store.move_recording(&rec.id, Some(&beats.id)).unwrap_err();
        assert!(matches!(err, ReelboxError::NameConflict(ref n) if n == "Loop"));
        assert!(store.backend.has_file(&[], "Loop.webm"));

        let moved = store
            .move_recording_with_rename(&rec.id, Some(&beats.id), "Loop B")
            .unwrap();
        assert_eq!(moved.folder_id, beats.id);
        assert_eq!(moved.tab_title, "Loop B");
        assert_eq!(moved.filename, "Loop B.webm");
        assert!(store.backend.has_file(&["Beats"], "Loop B.webm"));
        assert!(!store.backend.has_file(&[], "Loop.webm"));
        assert_eq!(store.get_recording_blob(&rec.id).unwrap(), b"Loop");
    }

    #[test]
    fn test_move_with_rename_failed_write_changes_nothing() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        let rec = save(&mut store, "Loop", None);
        store.backend.fail_writes_to("Fresh.webm");

        assert!(store
            .move_recording_with_rename(&rec.id, Some(&beats.id), "Fresh")
            .is_err());
        let unchanged = store.recording(&rec.id).unwrap();
        assert_eq!(unchanged.folder_id, UNCATEGORIZED);
        assert!(store.backend.has_file(&[], "Loop.webm"));
    }

    #[test]
    fn test_move_crop_detaches_from_parent() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        let parent = save(&mut store, "full", None);
        let crop = store
            .save_recording(
                Recording::new("cut.webm", "cut").cropped_from(parent.id.clone()),
                b"c",
            )
            .unwrap();

        let moved = store.move_recording(&crop.id, Some(&beats.id)).unwrap();
        assert!(moved.parent_id.is_none());
        assert!(store.backend.has_file(&["Beats"], "cut.webm"));
    }

    #[test]
    fn test_move_finds_drifted_file() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        store.create_folder("Vox", None, None).unwrap();
        let rec = save(&mut store, "drift", Some(&beats.id));

        // Simulate an interrupted move: file in Vox, index still says Beats.
        store.backend.write_file(&["Vox".to_string()], "drift.webm", b"drift").unwrap();
        store.backend.delete_file(&["Beats".to_string()], "drift.webm").unwrap();
        assert_eq!(store.get_recording_blob(&rec.id).unwrap(), b"drift");

        store.move_recording(&rec.id, None).unwrap();
        assert!(store.backend.has_file(&[], "drift.webm"));
        assert!(!store.backend.has_file(&["Vox"], "drift.webm"));
    }

    #[test]
    fn test_fallback_ignores_files_owned_by_other_recordings() {
        let mut store = ready_store();
        let beats = store.create_folder("Beats", None, None).unwrap();
        let mine = save(&mut store, "same", None);
        save(&mut store, "same", Some(&beats.id));
        store.backend.delete_file(&[], "same.webm").unwrap();

        assert!(matches!(
            store.get_recording_blob(&mine.id),
            Err(ReelboxError::FileNotFound(_))
        ));
        // Deleting it must not take the other recording's file with it.
        store.delete_recording(&mine.id, false).unwrap();
        assert!(store.backend.has_file(&["Beats"], "same.webm"));
    }

    #[test]
    fn test_rename_recording_file() {
        let mut store = ready_store();
        let rec = save(&mut store, "take", None);
        let renamed = store.rename_recording(&rec.id, "final.webm").unwrap();
        assert_eq!(renamed.filename, "final.webm");
        assert!(store.backend.has_file(&[], "final.webm"));
        assert!(!store.backend.has_file(&[], "take.webm"));

        save(&mut store, "other", None);
        assert!(matches!(
            store.rename_recording(&rec.id, "other.webm"),
            Err(ReelboxError::NameConflict(_))
        ));
    }

    #[test]
    fn test_update_recording_metadata() {
        let mut store = ready_store();
        let rec = save(&mut store, "take", None);
        save(&mut store, "taken", None);

        let patch = RecordingPatch {
            rating: Some(Some(4)),
            bpm: Some(Some(128.0)),
            tags: Some(BTreeSet::from([" drums ".to_string(), "".to_string()])),
            notes: Some(Some("needs eq".to_string())),
            ..Default::default()
        };
        let updated = store.update_recording(&rec.id, patch).unwrap();
        assert_eq!(updated.rating, Some(4));
        assert_eq!(updated.bpm, Some(128.0));
        assert_eq!(updated.tags, BTreeSet::from(["drums".to_string()]));

        let bad_rating = RecordingPatch {
            rating: Some(Some(9)),
            ..Default::default()
        };
        assert!(store.update_recording(&rec.id, bad_rating).is_err());

        let clash = RecordingPatch {
            title: Some("taken".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_recording(&rec.id, clash),
            Err(ReelboxError::NameConflict(_))
        ));
    }

    #[test]
    fn test_bulk_update_dedupes_and_persists_once() {
        let mut store = ready_store();
        let a = save(&mut store, "a", None);
        let b = save(&mut store, "b", None);

        store
            .update_recordings(vec![b.clone(), a.clone(), b.clone()])
            .unwrap();
        let ids: Vec<&str> = store.recordings().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);

        let on_disk = index::load(&store.backend).unwrap().unwrap();
        assert_eq!(on_disk.recordings.len(), 2);
    }

    #[test]
    fn test_update_folders_rejects_cycles() {
        let mut store = ready_store();
        let a = store.create_folder("A", None, None).unwrap();
        let b = store.create_folder("B", Some(&a.id), None).unwrap();
        let mut folders = store.folders().to_vec();
        folders[0].parent_id = Some(b.id.clone());
        assert!(matches!(
            store.update_folders(folders),
            Err(ReelboxError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_reorder_recordings_touches_only_listed() {
        let mut store = ready_store();
        let a = save(&mut store, "a", None);
        let b = save(&mut store, "b", None);
        let c = save(&mut store, "c", None);

        store
            .reorder_recordings(&[c.id.clone(), a.id.clone()])
            .unwrap();
        let ids: Vec<&str> = store.recordings().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![c.id.as_str(), b.id.as_str(), a.id.as_str()]);
    }

    #[test]
    fn test_recording_location_follows_drifted_file() {
        let mut store = ready_store();
        let vox = store.create_folder("Vox", None, None).unwrap();
        let rec = save(&mut store, "drift", Some(&vox.id));
        assert_eq!(
            store.recording_location(&rec.id).unwrap(),
            PathBuf::from("memory://Vox/drift.webm")
        );

        store.backend.delete_file(&["Vox".to_string()], "drift.webm").unwrap();
        store.backend.write_file(&[], "drift.webm", b"x").unwrap();
        assert_eq!(
            store.recording_location(&rec.id).unwrap(),
            PathBuf::from("memory://drift.webm")
        );

        store.backend.delete_file(&[], "drift.webm").unwrap();
        assert!(matches!(
            store.recording_location(&rec.id),
            Err(ReelboxError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_reorder_recordings_rejects_repeated_ids() {
        let mut store = ready_store();
        let a = save(&mut store, "a", None);
        let b = save(&mut store, "b", None);
        save(&mut store, "c", None);

        assert!(matches!(
            store.reorder_recordings(&[b.id.clone(), a.id.clone(), a.id.clone()]),
            Err(ReelboxError::InvalidOperation(_))
        ));
        assert_eq!(store.recordings().len(), 3);
        assert!(store.recording(&b.id).is_ok());
    }
}
