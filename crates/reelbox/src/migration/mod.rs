//! # Legacy Migration
//!
//! One-time import of a legacy flat store into a folder-mirrored library.
//! Everything goes through the public [`LibraryStore`] operations, so the
//! imported library obeys the same invariants as one built by hand.
//!
//! ## Steps
//!
//! 1. **Folders**, root-most first (depth is measured in the legacy tree).
//!    Each is created under its already-migrated parent, or reused when a
//!    folder with the same name path already exists. Legacy folder ids are not
//!    kept; the old → new id map is built by matching full name paths.
//! 2. **Recordings**, crop parents before their crops. A recording whose blob
//!    is missing is skipped. A blob in another format goes through the
//!    [`Transcoder`]. Folder ids are remapped (anything unmapped lands in the
//!    root). A crop whose parent did not make it is detached. Clashing titles
//!    and filenames get a ` (n)` suffix.
//! 3. **Orphan blobs**, blobs with no legacy recording, are imported as
//!    uncategorized recordings so no audio is lost.
//! 4. The legacy store is cleared and marked completed. Running again is a
//!    no-op.
//!
//! ## Failure Policy
//!
//! A single folder or recording that fails is logged, counted in the
//! [`MigrationReport`] and skipped. Only failures reading the legacy document
//! or clearing it abort the run.

pub mod legacy;

use crate::error::{ReelboxError, Result};
use crate::model::{
    file_extension, file_stem, filename_for_title, unique_filename, unique_name,
    validate_entry_name, Folder, Recording, MAX_RATING, UNCATEGORIZED,
};
use crate::paths::{self, MAX_DEPTH};
use crate::store::{LibraryStore, StorageBackend};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

pub use legacy::{JsonLegacyStore, LegacyBlob, LegacyStore, MemLegacyStore};

pub const DEFAULT_TARGET_MIME: &str = "audio/webm";

/// Converts legacy audio into the library's target format.
pub trait Transcoder {
    fn target_mime(&self) -> &str;
    fn transcode(&self, blob: &LegacyBlob) -> Result<Vec<u8>>;
}

/// Accepts blobs already in the target format and rejects everything else.
pub struct PassthroughTranscoder {
    target: String,
}

impl PassthroughTranscoder {
    pub fn new(target_mime: impl Into<String>) -> Self {
        Self {
            target: target_mime.into(),
        }
    }
}

impl Default for PassthroughTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_MIME)
    }
}

impl Transcoder for PassthroughTranscoder {
    fn target_mime(&self) -> &str {
        &self.target
    }

    fn transcode(&self, blob: &LegacyBlob) -> Result<Vec<u8>> {
        if same_format(&blob.mime, &self.target) {
            Ok(blob.bytes.clone())
        } else {
            Err(ReelboxError::InvalidOperation(format!(
                "No transcoder available for {} -> {}",
                blob.mime, self.target
            )))
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MigrationReport {
    pub folders_created: usize,
    pub folders_reused: usize,
    pub recordings_migrated: usize,
    pub recordings_transcoded: usize,
    pub crops_detached: usize,
    pub orphan_blobs_imported: usize,
    /// Legacy recording ids skipped because their blob was missing.
    pub skipped: Vec<String>,
    pub failures: Vec<String>,
}

/// True when the legacy store holds anything and was never migrated.
pub fn needs_migration<L: LegacyStore>(legacy: &L) -> Result<bool> {
    if legacy.migration_completed() {
        return Ok(false);
    }
    Ok(!legacy.recordings()?.is_empty()
        || !legacy.folders()?.is_empty()
        || !legacy.blob_ids()?.is_empty())
}

pub fn migrate<B, L, T>(
    store: &mut LibraryStore<B>,
    legacy: &mut L,
    transcoder: &T,
) -> Result<MigrationReport>
where
    B: StorageBackend,
    L: LegacyStore,
    T: Transcoder,
{
    let mut report = MigrationReport::default();
    if legacy.migration_completed() {
        info!("Legacy migration already completed");
        return Ok(report);
    }
    if !store.is_ready() {
        return Err(ReelboxError::InvalidOperation(
            "Library must be open before migrating".to_string(),
        ));
    }

    let legacy_folders = legacy.folders()?;
    let legacy_recordings = legacy.recordings()?;
    let blob_ids = legacy.blob_ids()?;
    info!(
        folders = legacy_folders.len(),
        recordings = legacy_recordings.len(),
        blobs = blob_ids.len(),
        "Migrating legacy store"
    );

    let folder_map = migrate_folders(store, &legacy_folders, &mut report);

    let mut migrated: HashSet<String> = HashSet::new();
    for recording in crop_parents_first(legacy_recordings.clone()) {
        let id = recording.id.clone();
        let outcome = migrate_recording(
            store,
            legacy,
            transcoder,
            recording,
            &folder_map,
            &migrated,
            &mut report,
        );
        match outcome {
            Ok(true) => {
                migrated.insert(id);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(recording = %id, error = %e, "Failed to migrate recording");
                report.failures.push(format!("recording {}: {}", id, e));
            }
        }
    }

    let known: HashSet<&str> = legacy_recordings.iter().map(|r| r.id.as_str()).collect();
    for blob_id in blob_ids.iter().filter(|id| !known.contains(id.as_str())) {
        match import_orphan_blob(store, legacy, transcoder, blob_id) {
            Ok(true) => report.orphan_blobs_imported += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(blob = %blob_id, error = %e, "Failed to import orphan blob");
                report.failures.push(format!("blob {}: {}", blob_id, e));
            }
        }
    }

    legacy.clear()?;
    legacy.mark_migration_completed()?;
    info!(
        migrated = report.recordings_migrated,
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        "Legacy migration complete"
    );
    Ok(report)
}

/// Creates or reuses the folder tree, returning legacy id → new id.
fn migrate_folders<B: StorageBackend>(
    store: &mut LibraryStore<B>,
    legacy_folders: &[Folder],
    report: &mut MigrationReport,
) -> HashMap<String, String> {
    let mut ordered: Vec<&Folder> = legacy_folders.iter().collect();
    ordered.sort_by_key(|f| paths::folder_depth(&f.id, legacy_folders));

    let mut map = HashMap::new();
    for folder in ordered {
        if paths::would_create_cycle(&folder.id, folder.parent_id.as_deref(), legacy_folders) {
            warn!(folder = %folder.id, "Legacy folder is part of a parent cycle, skipping");
            report.failures.push(format!("folder {}: parent cycle", folder.id));
            continue;
        }
        let path = paths::folder_path(Some(&folder.id), legacy_folders);

        if let Some(existing) = store.find_folder_by_path(&path) {
            map.insert(folder.id.clone(), existing.id.clone());
            report.folders_reused += 1;
            continue;
        }

        let parent_path = &path[..path.len() - 1];
        let parent_id = if parent_path.is_empty() {
            None
        } else {
            match store.find_folder_by_path(parent_path) {
                Some(parent) => Some(parent.id.clone()),
                None => {
                    warn!(folder = %folder.id, "Parent of legacy folder was not migrated");
                    report.failures.push(format!("folder {}: parent missing", folder.id));
                    continue;
                }
            }
        };

        match store.create_folder(&folder.name, parent_id.as_deref(), Some(folder.color.as_str())) {
            Ok(created) => {
                map.insert(folder.id.clone(), created.id);
                report.folders_created += 1;
            }
            Err(e) => {
                warn!(folder = %folder.id, error = %e, "Failed to migrate folder");
                report.failures.push(format!("folder {}: {}", folder.id, e));
            }
        }
    }
    map
}

/// Stable order in which every crop follows the recording it was cut from.
fn crop_parents_first(mut recordings: Vec<Recording>) -> Vec<Recording> {
    let parents: HashMap<String, Option<String>> = recordings
        .iter()
        .map(|r| (r.id.clone(), r.parent_id.clone()))
        .collect();
    let depth = |id: &str| {
        let mut hops = 0;
        let mut current = parents.get(id).cloned().flatten();
        while let Some(parent) = current {
            hops += 1;
            if hops >= MAX_DEPTH {
                break;
            }
            current = parents.get(&parent).cloned().flatten();
        }
        hops
    };
    recordings.sort_by_cached_key(|r| depth(&r.id));
    recordings
}

/// Bytes in the target format, and whether a conversion happened.
fn target_bytes<T: Transcoder>(transcoder: &T, blob: &LegacyBlob) -> Result<(Vec<u8>, bool)> {
    if same_format(&blob.mime, transcoder.target_mime()) {
        Ok((blob.bytes.clone(), false))
    } else {
        Ok((transcoder.transcode(blob)?, true))
    }
}

/// `Ok(false)` when the recording was skipped rather than migrated.
fn migrate_recording<B, L, T>(
    store: &mut LibraryStore<B>,
    legacy: &L,
    transcoder: &T,
    mut recording: Recording,
    folder_map: &HashMap<String, String>,
    migrated: &HashSet<String>,
    report: &mut MigrationReport,
) -> Result<bool>
where
    B: StorageBackend,
    L: LegacyStore,
    T: Transcoder,
{
    // Saved by an earlier run that stopped before clearing the legacy store.
    if store.recording(&recording.id).is_ok() {
        return Ok(true);
    }

    let Some(blob) = legacy.blob(&recording.id)? else {
        warn!(recording = %recording.id, "Legacy recording has no audio, skipping");
        report.skipped.push(recording.id);
        return Ok(false);
    };
    let (bytes, transcoded) = target_bytes(transcoder, &blob)?;

    let folder = recording
        .folder()
        .and_then(|old| folder_map.get(old))
        .cloned();
    recording.folder_id = folder.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());

    if let Some(parent) = recording.parent_id.as_deref() {
        if !migrated.contains(parent) {
            warn!(recording = %recording.id, parent, "Crop parent was not migrated, detaching");
            recording.parent_id = None;
            report.crops_detached += 1;
        }
    }

    let title = recording.display_title();
    let base_filename = if transcoded {
        let ext = extension_for_mime(transcoder.target_mime());
        format!("{}{}", file_stem(&recording.filename), ext)
    } else {
        recording.filename.clone()
    };
    let base_filename = if validate_entry_name(&base_filename).is_ok() {
        base_filename
    } else {
        filename_for_title(&title, file_extension(&base_filename))
    };

    let folder = folder.as_deref();
    recording.tab_title = unique_name(&title, |t| store.title_taken(folder, t, &recording.id));
    recording.filename =
        unique_filename(&base_filename, |f| store.filename_taken(folder, f, &recording.id));
    recording.rating = recording.rating.map(|r| r.min(MAX_RATING));

    store.save_recording(recording, &bytes)?;
    report.recordings_migrated += 1;
    if transcoded {
        report.recordings_transcoded += 1;
    }
    Ok(true)
}

fn import_orphan_blob<B, L, T>(
    store: &mut LibraryStore<B>,
    legacy: &L,
    transcoder: &T,
    blob_id: &str,
) -> Result<bool>
where
    B: StorageBackend,
    L: LegacyStore,
    T: Transcoder,
{
    if store.recording(blob_id).is_ok() {
        return Ok(false);
    }
    let Some(blob) = legacy.blob(blob_id)? else {
        return Ok(false);
    };
    let (bytes, _) = target_bytes(transcoder, &blob)?;

    let short: String = blob_id.chars().take(8).collect();
    let title = unique_name(&format!("Recovered {}", short), |t| {
        store.title_taken(None, t, blob_id)
    });
    let filename = unique_filename(
        &filename_for_title(&title, extension_for_mime(transcoder.target_mime())),
        |f| store.filename_taken(None, f, blob_id),
    );

    let mut recording = Recording::new(filename, title);
    recording.id = blob_id.to_string();
    store.save_recording(recording, &bytes)?;
    info!(blob = %blob_id, "Imported orphan legacy blob");
    Ok(true)
}

/// Compares content types ignoring parameters such as `;codecs=opus`.
fn same_format(a: &str, b: &str) -> bool {
    let essence = |m: &str| m.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence(a) == essence(b)
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or_default().trim() {
        "audio/webm" | "video/webm" => ".webm",
        "audio/ogg" => ".ogg",
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "audio/wav" | "audio/wave" | "audio/x-wav" => ".wav",
        "audio/mp4" | "audio/x-m4a" => ".m4a",
        "audio/flac" => ".flac",
        _ => "",
    }
}
