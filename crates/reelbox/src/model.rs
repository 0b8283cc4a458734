//! # Domain Model: Folders, Recordings and the Library
//!
//! This module defines the core data structures for reelbox: [`Folder`],
//! [`Recording`] and [`LibraryData`], the in-memory form of the index document.
//!
//! ## Folders
//!
//! Folders form a tree through `parent_id`. A `None` parent means the folder
//! sits at the library root. Every folder mirrors a real directory whose path
//! is the chain of folder names from the root (see [`crate::paths`]).
//!
//! ## Recordings
//!
//! A recording is one audio file plus its metadata. `folder_id` names the
//! folder holding the file, or the [`UNCATEGORIZED`] sentinel for files kept
//! directly at the library root.
//!
//! A recording whose `parent_id` is set is a **crop**: an excerpt trimmed from
//! another recording. Crops are full recordings in every other respect (own
//! file, own folder, own metadata) and can be cropped again.
//!
//! ## Titles and Filenames
//!
//! The display title is the captured tab title, falling back to the filename
//! stem when the title is blank. Within one folder, display titles and
//! filenames are unique; [`unique_name`] and [`unique_filename`] produce
//! ` (2)`, ` (3)`… variants when a clash has to be resolved automatically.
//!
//! ## Serialized Form
//!
//! Keys are camelCase and timestamps are integer milliseconds, matching the
//! index document written by [`crate::index`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{ReelboxError, Result};

/// Folder id used by recordings that live directly at the library root.
pub const UNCATEGORIZED: &str = "uncategorized";

pub const DEFAULT_FOLDER_COLOR: &str = "#64748b";

/// True when `folder_id` refers to the library root rather than a real folder.
pub fn is_uncategorized(folder_id: Option<&str>) -> bool {
    match folder_id {
        None => true,
        Some(id) => id.is_empty() || id == UNCATEGORIZED,
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_color() -> String {
    DEFAULT_FOLDER_COLOR.to_string()
}

impl Folder {
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            parent_id,
            color: default_color(),
            created_at: Utc::now(),
            sort_order: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub filename: String,
    #[serde(default = "default_folder_id")]
    pub folder_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tab_title: String,
    #[serde(default)]
    pub tab_url: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

fn default_folder_id() -> String {
    UNCATEGORIZED.to_string()
}

impl Recording {
    /// A fresh uncategorized recording with a generated id.
    pub fn new(filename: impl Into<String>, tab_title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            filename: filename.into(),
            folder_id: default_folder_id(),
            parent_id: None,
            duration: 0.0,
            timestamp: Utc::now(),
            tab_title: tab_title.into(),
            tab_url: String::new(),
            hostname: String::new(),
            size: 0,
            bpm: None,
            rating: None,
            tags: BTreeSet::new(),
            color: None,
            notes: None,
            key: None,
        }
    }

    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = folder_id.into();
        self
    }

    pub fn cropped_from(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_crop(&self) -> bool {
        self.parent_id.is_some()
    }

    /// The folder id as an `Option`, `None` for the sentinel.
    pub fn folder(&self) -> Option<&str> {
        if is_uncategorized(Some(&self.folder_id)) {
            None
        } else {
            Some(&self.folder_id)
        }
    }

    pub fn display_title(&self) -> String {
        let title = self.tab_title.trim();
        if title.is_empty() {
            file_stem(&self.filename).to_string()
        } else {
            title.to_string()
        }
    }
}

/// Partial metadata update for [`crate::store::LibraryStore::update_recording`].
/// `None` leaves a field untouched; the inner `Option`s clear the field.
#[derive(Debug, Clone, Default)]
pub struct RecordingPatch {
    pub title: Option<String>,
    pub bpm: Option<Option<f64>>,
    pub rating: Option<Option<u8>>,
    pub tags: Option<BTreeSet<String>>,
    pub color: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub key: Option<Option<String>>,
}

pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryData {
    pub version: u32,
    pub recordings: Vec<Recording>,
    pub folders: Vec<Folder>,
}

impl LibraryData {
    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    pub fn recording(&self, id: &str) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    pub fn recording_mut(&mut self, id: &str) -> Option<&mut Recording> {
        self.recordings.iter_mut().find(|r| r.id == id)
    }

    /// Folders directly under `parent_id`, in sort order.
    pub fn child_folders(&self, parent_id: Option<&str>) -> Vec<&Folder> {
        let mut children: Vec<&Folder> = self
            .folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == parent_id)
            .collect();
        children.sort_by_key(|f| f.sort_order);
        children
    }

    /// Recordings whose file lives in `folder_id` (`None` for the root).
    pub fn recordings_in(&self, folder_id: Option<&str>) -> Vec<&Recording> {
        self.recordings
            .iter()
            .filter(|r| r.folder() == folder_id)
            .collect()
    }

    pub fn crops_of(&self, recording_id: &str) -> Vec<&Recording> {
        self.recordings
            .iter()
            .filter(|r| r.parent_id.as_deref() == Some(recording_id))
            .collect()
    }
}

/// Validates a folder name or filename as a single directory entry.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ReelboxError::InvalidOperation(
            "Name cannot be empty".to_string(),
        ));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(ReelboxError::InvalidOperation(format!(
            "'{}' is not a valid name",
            trimmed
        )));
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(ReelboxError::InvalidOperation(format!(
            "'{}' contains a path separator",
            trimmed
        )));
    }
    Ok(())
}

pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(pos) => &filename[..pos],
    }
}

/// Extension including the leading dot, or an empty string.
pub fn file_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &filename[pos..],
    }
}

/// Derives a filesystem-safe filename from a display title.
pub fn filename_for_title(title: &str, extension: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let stem = if stem.is_empty() { "recording" } else { stem };
    format!("{}{}", stem, extension)
}

/// Returns `base`, or the first of `base (2)`, `base (3)`… not already taken.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{} ({})", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Like [`unique_name`] but keeps the extension after the suffix.
pub fn unique_filename(filename: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(filename) {
        return filename.to_string();
    }
    let stem = file_stem(filename);
    let ext = file_extension(filename);
    (2..)
        .map(|n| format!("{} ({}){}", stem, n, ext))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        assert!(is_uncategorized(None));
        assert!(is_uncategorized(Some(UNCATEGORIZED)));
        assert!(is_uncategorized(Some("")));
        assert!(!is_uncategorized(Some("abc")));
    }

    #[test]
    fn test_display_title_falls_back_to_stem() {
        let rec = Recording::new("loop-01.webm", "   ");
        assert_eq!(rec.display_title(), "loop-01");

        let rec = Recording::new("loop-01.webm", " Drum Break ");
        assert_eq!(rec.display_title(), "Drum Break");
    }

    #[test]
    fn test_filename_helpers() {
        assert_eq!(file_stem("a.b.webm"), "a.b");
        assert_eq!(file_extension("a.b.webm"), ".webm");
        assert_eq!(file_extension(".hidden"), "");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_filename_for_title_sanitizes() {
        assert_eq!(filename_for_title("AC/DC: Live?", ".webm"), "AC_DC_ Live_.webm");
        assert_eq!(filename_for_title("  ..  ", ".wav"), "recording.wav");
    }

    #[test]
    fn test_unique_name_suffixes() {
        let taken = ["Kick", "Kick (2)"];
        assert_eq!(unique_name("Kick", |n| taken.contains(&n)), "Kick (3)");
        assert_eq!(unique_name("Snare", |n| taken.contains(&n)), "Snare");
    }

    #[test]
    fn test_unique_filename_keeps_extension() {
        let taken = ["kick.webm"];
        assert_eq!(
            unique_filename("kick.webm", |n| taken.contains(&n)),
            "kick (2).webm"
        );
    }

    #[test]
    fn test_validate_entry_name() {
        assert!(validate_entry_name("Beats").is_ok());
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name("..").is_err());
        assert!(validate_entry_name("a/b").is_err());
    }

    #[test]
    fn test_recording_json_shape() {
        let rec = Recording::new("a.webm", "A").in_folder("f1").cropped_from("p1");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["folderId"], "f1");
        assert_eq!(json["parentId"], "p1");
        assert_eq!(json["tabTitle"], "A");
        assert!(json["timestamp"].is_i64());
        assert!(json.get("bpm").is_none());
    }

    #[test]
    fn test_recording_defaults_when_fields_missing() {
        let json = r#"{"id":"r1","filename":"a.webm","timestamp":0}"#;
        let rec: Recording = serde_json::from_str(json).unwrap();
        assert_eq!(rec.folder_id, UNCATEGORIZED);
        assert!(rec.folder().is_none());
        assert!(rec.tags.is_empty());
    }
}
