//! Legacy flat stores: a key-value document of recordings and folders plus a
//! separate blob store keyed by recording id. No directory mirroring.
//!
//! On disk ([`JsonLegacyStore`]):
//!
//! ```text
//! <legacy_dir>/
//! ├── legacy.json          # {recordings, folders, migrationCompleted}
//! └── blobs/
//!     ├── <id>             # raw audio bytes
//!     └── <id>.mime        # content type, e.g. "audio/ogg"
//! ```

use crate::error::Result;
use crate::model::{validate_entry_name, Folder, Recording};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const LEGACY_FILE: &str = "legacy.json";
pub const BLOB_DIR: &str = "blobs";
const MIME_SUFFIX: &str = ".mime";
const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl LegacyBlob {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

/// Read access to a legacy store plus the two writes migration needs.
pub trait LegacyStore {
    fn recordings(&self) -> Result<Vec<Recording>>;
    fn folders(&self) -> Result<Vec<Folder>>;
    fn blob(&self, id: &str) -> Result<Option<LegacyBlob>>;
    /// Ids of every stored blob, including ones no recording refers to.
    fn blob_ids(&self) -> Result<Vec<String>>;
    /// Drops all recordings, folders and blobs. The completion flag survives.
    fn clear(&mut self) -> Result<()>;
    fn migration_completed(&self) -> bool;
    fn mark_migration_completed(&mut self) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDocument {
    #[serde(default)]
    recordings: Vec<Recording>,
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(default)]
    migration_completed: bool,
}

/// A legacy store kept as a directory. A directory without `legacy.json`
/// reads as an empty store.
pub struct JsonLegacyStore {
    dir: PathBuf,
}

impl JsonLegacyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self) -> PathBuf {
        self.dir.join(LEGACY_FILE)
    }

    fn blob_dir(&self) -> PathBuf {
        self.dir.join(BLOB_DIR)
    }

    fn read_document(&self) -> Result<LegacyDocument> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(LegacyDocument::default());
        }
        let content = fs::read(&path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn write_document(&self, doc: &LegacyDocument) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.document_path(), serde_json::to_vec_pretty(doc)?)?;
        Ok(())
    }
}

impl LegacyStore for JsonLegacyStore {
    fn recordings(&self) -> Result<Vec<Recording>> {
        Ok(self.read_document()?.recordings)
    }

    fn folders(&self) -> Result<Vec<Folder>> {
        Ok(self.read_document()?.folders)
    }

    fn blob(&self, id: &str) -> Result<Option<LegacyBlob>> {
        if validate_entry_name(id).is_err() {
            return Ok(None);
        }
        let path = self.blob_dir().join(id);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let mime = fs::read_to_string(self.blob_dir().join(format!("{}{}", id, MIME_SUFFIX)))
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|_| UNKNOWN_MIME.to_string());
        Ok(Some(LegacyBlob { mime, bytes }))
    }

    fn blob_ids(&self) -> Result<Vec<String>> {
        let dir = self.blob_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(MIME_SUFFIX) {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn clear(&mut self) -> Result<()> {
        let completed = self.migration_completed();
        let blobs = self.blob_dir();
        if blobs.exists() {
            fs::remove_dir_all(&blobs)?;
        }
        self.write_document(&LegacyDocument {
            migration_completed: completed,
            ..Default::default()
        })
    }

    fn migration_completed(&self) -> bool {
        self.read_document()
            .map(|doc| doc.migration_completed)
            .unwrap_or(false)
    }

    fn mark_migration_completed(&mut self) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.migration_completed = true;
        self.write_document(&doc)
    }
}

/// In-memory legacy store for tests.
#[derive(Debug, Default)]
pub struct MemLegacyStore {
    pub recordings: Vec<Recording>,
    pub folders: Vec<Folder>,
    pub blobs: BTreeMap<String, LegacyBlob>,
    pub completed: bool,
}

impl MemLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folders.push(folder);
        self
    }

    /// Adds a recording and, when given, its blob.
    pub fn with_recording(mut self, recording: Recording, blob: Option<LegacyBlob>) -> Self {
        if let Some(blob) = blob {
            self.blobs.insert(recording.id.clone(), blob);
        }
        self.recordings.push(recording);
        self
    }

    pub fn with_blob(mut self, id: impl Into<String>, blob: LegacyBlob) -> Self {
        self.blobs.insert(id.into(), blob);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty() && self.folders.is_empty() && self.blobs.is_empty()
    }
}

impl LegacyStore for MemLegacyStore {
    fn recordings(&self) -> Result<Vec<Recording>> {
        Ok(self.recordings.clone())
    }

    fn folders(&self) -> Result<Vec<Folder>> {
        Ok(self.folders.clone())
    }

    fn blob(&self, id: &str) -> Result<Option<LegacyBlob>> {
        Ok(self.blobs.get(id).cloned())
    }

    fn blob_ids(&self) -> Result<Vec<String>> {
        Ok(self.blobs.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.recordings.clear();
        self.folders.clear();
        self.blobs.clear();
        Ok(())
    }

    fn migration_completed(&self) -> bool {
        self.completed
    }

    fn mark_migration_completed(&mut self) -> Result<()> {
        self.completed = true;
        Ok(())
    }
}
