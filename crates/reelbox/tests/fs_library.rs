use reelbox::index::INDEX_FILE;
use reelbox::store::fs_backend::FsBackend;
use reelbox::store::StorageBackend;
use reelbox::{LibraryStore, Recording, ReelboxError, UNCATEGORIZED};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup() -> (TempDir, LibraryStore<FsBackend>) {
    let dir = TempDir::new().unwrap();
    let mut store = LibraryStore::with_backend(FsBackend::new(Some(dir.path().to_path_buf())));
    store.init().unwrap();
    (dir, store)
}

fn reopen(root: &Path) -> LibraryStore<FsBackend> {
    let mut store = LibraryStore::with_backend(FsBackend::new(Some(root.to_path_buf())));
    store.init().unwrap();
    store
}

#[test]
fn test_folder_tree_walkthrough() {
    let (dir, mut store) = setup();
    let root = dir.path();

    let beats = store.create_folder("Beats", None, None).unwrap();
    let trap = store.create_folder("Trap", Some(&beats.id), None).unwrap();
    assert_eq!(store.folder_path(Some(&trap.id)), vec!["Beats", "Trap"]);

    let r1 = store
        .save_recording(
            Recording::new("r1.webm", "R1").in_folder(trap.id.clone()),
            b"r1 audio",
        )
        .unwrap();
    assert!(root.join("Beats/Trap/r1.webm").is_file());

    let relocation = store.rename_folder(&trap.id, "Trap2").unwrap();
    assert!(relocation.is_complete());
    let r1_now = store.recording(&r1.id).unwrap();
    assert_eq!(store.recording_path(r1_now), vec!["Beats", "Trap2"]);
    assert!(root.join("Beats/Trap2/r1.webm").is_file());
    assert!(!root.join("Beats/Trap").exists());

    store.move_folder(&trap.id, None).unwrap();
    assert_eq!(store.folder_path(Some(&trap.id)), vec!["Trap2"]);
    assert!(root.join("Trap2/r1.webm").is_file());

    store.move_folder(&beats.id, Some(&trap.id)).unwrap();
    assert_eq!(store.folder_path(Some(&beats.id)), vec!["Trap2", "Beats"]);
    assert!(root.join("Trap2/Beats").is_dir());

    // Beats now sits under Trap2, so the reverse move would be a cycle.
    let err = store.move_folder(&trap.id, Some(&beats.id)).unwrap_err();
    assert!(matches!(err, ReelboxError::InvalidOperation(_)));

    let reopened = reopen(root);
    assert_eq!(reopened.folders().len(), 2);
    assert_eq!(reopened.get_recording_blob(&r1.id).unwrap(), b"r1 audio");
}

#[test]
fn test_move_conflict_and_move_with_rename() {
    let (dir, mut store) = setup();
    let beats = store.create_folder("Beats", None, None).unwrap();
    store
        .save_recording(Recording::new("loop.webm", "Loop").in_folder(beats.id.clone()), b"1")
        .unwrap();
    let loose = store
        .save_recording(Recording::new("loop-2.webm", "Loop"), b"2")
        .unwrap();

    let err = store.move_recording(&loose.id, Some(&beats.id)).unwrap_err();
    assert!(matches!(err, ReelboxError::NameConflict(_)));

    let moved = store
        .move_recording_with_rename(&loose.id, Some(&beats.id), "Loop (alt)")
        .unwrap();
    assert_eq!(moved.filename, "Loop (alt).webm");
    assert!(dir.path().join("Beats/Loop (alt).webm").is_file());
    assert!(!dir.path().join("loop-2.webm").exists());
    assert_eq!(fs::read(dir.path().join("Beats/Loop (alt).webm")).unwrap(), b"2");
}

#[test]
fn test_delete_folder_keep_and_drop_contents() {
    let (dir, mut store) = setup();
    let beats = store.create_folder("Beats", None, None).unwrap();
    let trap = store.create_folder("Trap", Some(&beats.id), None).unwrap();
    let kept = store
        .save_recording(Recording::new("keep.webm", "keep").in_folder(trap.id.clone()), b"keep")
        .unwrap();

    let report = store.delete_folder(&trap.id, false).unwrap();
    assert_eq!(report.recordings_relocated, 1);
    assert!(report.failures.is_empty());
    let survivor = store.recording(&kept.id).unwrap();
    assert_eq!(survivor.folder_id, beats.id);
    assert_eq!(store.get_recording_blob(&kept.id).unwrap(), b"keep");
    assert!(!dir.path().join("Beats/Trap").exists());

    let report = store.delete_folder(&beats.id, true).unwrap();
    assert_eq!(report.recordings_removed, 1);
    assert!(store.recording(&kept.id).is_err());
    assert!(!dir.path().join("Beats").exists());
    assert!(store.folders().is_empty());
}

#[test]
fn test_index_document_on_disk() {
    let (dir, mut store) = setup();
    store
        .save_recording(Recording::new("a.webm", "A"), b"a")
        .unwrap();

    let raw = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["recordings"][0]["folderId"], UNCATEGORIZED);
    assert_eq!(json["recordings"][0]["tabTitle"], "A");
    assert!(json["recordings"][0]["timestamp"].is_i64());
    // No temp files left behind by atomic writes.
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().all(|n| !n.ends_with(".tmp")));
}

#[test]
fn test_corrupt_index_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(INDEX_FILE), "{ definitely not json").unwrap();
    let mut store = LibraryStore::with_backend(FsBackend::new(Some(dir.path().to_path_buf())));
    assert!(matches!(store.init(), Err(ReelboxError::ReadFailed(_))));
    // The document is left for the user to repair.
    assert_eq!(
        fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap(),
        "{ definitely not json"
    );
}

#[test]
fn test_drifted_file_is_found_and_reported() {
    let (dir, mut store) = setup();
    let beats = store.create_folder("Beats", None, None).unwrap();
    store.create_folder("Vox", None, None).unwrap();
    let rec = store
        .save_recording(Recording::new("take.webm", "take").in_folder(beats.id.clone()), b"t")
        .unwrap();

    fs::rename(dir.path().join("Beats/take.webm"), dir.path().join("Vox/take.webm")).unwrap();

    assert_eq!(store.get_recording_blob(&rec.id).unwrap(), b"t");
    let report = store.doctor().unwrap();
    assert_eq!(report.misplaced, vec![rec.id.clone()]);

    // Moving the recording clears the drift.
    store.move_recording(&rec.id, None).unwrap();
    assert!(dir.path().join("take.webm").is_file());
    assert!(!dir.path().join("Vox/take.webm").exists());
    assert!(store.doctor().unwrap().is_clean());
}

#[test]
fn test_missing_root_is_created_on_open() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("new-library");
    let mut store = LibraryStore::with_backend(FsBackend::new(Some(root.clone())));
    store.init().unwrap();
    assert!(root.join(INDEX_FILE).is_file());
    assert!(store.backend().root_selected());
}
