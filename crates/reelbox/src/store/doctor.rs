//! Read-only drift report between the index and the directory tree.
//!
//! Nothing is repaired here. A misplaced file is still usable (the fallback
//! search finds it) and the next move or rename of the recording puts it back
//! where it belongs.

use super::{LibraryStore, StorageBackend};
use crate::config::CONFIG_FILE;
use crate::error::Result;
use crate::index::INDEX_FILE;
use crate::paths::MAX_DEPTH;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DoctorReport {
    pub in_place: usize,
    /// Recording ids whose file was found outside the expected directory.
    pub misplaced: Vec<String>,
    /// Recording ids whose file was not found anywhere.
    pub missing: Vec<String>,
    /// `dir/.../file` paths no recording references.
    pub orphan_files: Vec<String>,
    /// Directories that correspond to no folder.
    pub orphan_directories: Vec<String>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.misplaced.is_empty()
            && self.missing.is_empty()
            && self.orphan_files.is_empty()
            && self.orphan_directories.is_empty()
    }
}

impl<B: StorageBackend> LibraryStore<B> {
    pub fn doctor(&self) -> Result<DoctorReport> {
        self.require_ready()?;
        let mut report = DoctorReport::default();
        let mut referenced: HashSet<(Vec<String>, String)> = HashSet::new();

        for recording in &self.data.recordings {
            let expected = self.recording_path(recording);
            match self.locate_file(recording) {
                Some(found) if found == expected => report.in_place += 1,
                Some(found) => {
                    report.misplaced.push(recording.id.clone());
                    referenced.insert((found, recording.filename.clone()));
                    continue;
                }
                None => report.missing.push(recording.id.clone()),
            }
            referenced.insert((expected, recording.filename.clone()));
        }

        let known_dirs: HashSet<Vec<String>> = self
            .data
            .folders
            .iter()
            .map(|f| self.folder_path(Some(&f.id)))
            .collect();

        let mut pending = vec![Vec::<String>::new()];
        while let Some(dir) = pending.pop() {
            let listing = self.backend.list_directory(&dir)?;
            for file in listing.files {
                if dir.is_empty() && (file == INDEX_FILE || file == CONFIG_FILE) {
                    continue;
                }
                if !referenced.contains(&(dir.clone(), file.clone())) {
                    report.orphan_files.push(joined(&dir, &file));
                }
            }
            for sub in listing.directories {
                let mut child = dir.clone();
                child.push(sub);
                if !known_dirs.contains(&child) {
                    report.orphan_directories.push(child.join("/"));
                }
                if child.len() < MAX_DEPTH {
                    pending.push(child);
                }
            }
        }

        report.orphan_files.sort();
        report.orphan_directories.sort();
        debug!(
            in_place = report.in_place,
            misplaced = report.misplaced.len(),
            missing = report.missing.len(),
            orphans = report.orphan_files.len(),
            "Doctor scan complete"
        );
        Ok(report)
    }
}

fn joined(dir: &[String], file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir.join("/"), file)
    }
}
