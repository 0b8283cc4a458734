//! Terminal output. Every user-facing line is produced here; handlers in
//! `commands.rs` only decide *what* to show.

use console::style;
use reelbox::migration::MigrationReport;
use reelbox::store::{DeleteReport, DoctorReport, FolderRelocation, StorageBackend};
use reelbox::{Folder, LibraryStore, Recording};

pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.join("/")
    }
}

pub fn relocation(report: &FolderRelocation) {
    if report.is_complete() {
        return;
    }
    for failed in &report.failed {
        warning(&format!("Could not copy {}", failed));
    }
    if !report.old_directory_removed {
        warning("The old directory was kept because not every file was copied");
    }
}

pub fn deletion(report: &DeleteReport) {
    let mut parts = vec![format!(
        "{} folder(s), {} recording(s) removed",
        report.folders_removed, report.recordings_removed
    )];
    if report.recordings_relocated + report.folders_relocated > 0 {
        parts.push(format!(
            "{} recording(s) and {} folder(s) moved up",
            report.recordings_relocated, report.folders_relocated
        ));
    }
    success(&parts.join("; "));
    for failure in &report.failures {
        warning(failure);
    }
    if report.folder_kept {
        warning("The folder was kept because some of its contents could not be moved out");
    }
}

pub fn folder_tree<B: StorageBackend>(store: &LibraryStore<B>, parent: Option<&Folder>) {
    let (start, depth) = match parent {
        Some(folder) => {
            println!("{}", style(display_path(&store.folder_path(Some(&folder.id)))).bold());
            (Some(folder.id.as_str()), 1)
        }
        None => (None, 0),
    };
    let children = store.data().child_folders(start);
    if children.is_empty() && parent.is_none() {
        println!("{}", style("No folders yet").dim());
    }
    for child in children {
        print_branch(store, child, depth);
    }
}

fn print_branch<B: StorageBackend>(store: &LibraryStore<B>, folder: &Folder, depth: usize) {
    let count = store.data().recordings_in(Some(&folder.id)).len();
    println!(
        "{}{} {}",
        "  ".repeat(depth),
        style(&folder.name).cyan().bold(),
        style(format!("({})", count)).dim()
    );
    // Bounded in case the index holds a cycle.
    if depth < reelbox::paths::MAX_DEPTH {
        for child in store.data().child_folders(Some(&folder.id)) {
            print_branch(store, child, depth + 1);
        }
    }
}

pub fn recordings(list: &[&Recording]) {
    if list.is_empty() {
        println!("{}", style("No recordings here").dim());
        return;
    }
    for rec in list {
        let mut line = format!(
            "{}  {}  {}",
            style(short_id(&rec.id)).dim(),
            rec.timestamp.format("%Y-%m-%d %H:%M"),
            style(rec.display_title()).bold()
        );
        if let Some(rating) = rec.rating {
            line.push_str(&format!("  {}", style("★".repeat(rating as usize)).yellow()));
        }
        if !rec.tags.is_empty() {
            let tags: Vec<&str> = rec.tags.iter().map(String::as_str).collect();
            line.push_str(&format!("  {}", style(format!("#{}", tags.join(" #"))).magenta()));
        }
        if rec.is_crop() {
            line.push_str(&format!("  {}", style("crop").dim()));
        }
        println!("{}", line);
    }
}

pub fn doctor(report: &DoctorReport) {
    if report.is_clean() {
        success(&format!("{} recording(s) in place, nothing drifted", report.in_place));
        return;
    }
    println!("{} recording(s) in place", report.in_place);
    for id in &report.misplaced {
        warning(&format!("Misplaced (found by search): {}", short_id(id)));
    }
    for id in &report.missing {
        warning(&format!("Missing file: {}", short_id(id)));
    }
    for file in &report.orphan_files {
        warning(&format!("Untracked file: {}", file));
    }
    for dir in &report.orphan_directories {
        warning(&format!("Untracked directory: {}", dir));
    }
}

pub fn migration(report: &MigrationReport) {
    success(&format!(
        "Migrated {} recording(s) and {} folder(s) from the legacy store",
        report.recordings_migrated,
        report.folders_created + report.folders_reused
    ));
    if report.orphan_blobs_imported > 0 {
        println!(
            "  {} unlisted recording(s) recovered into the root",
            report.orphan_blobs_imported
        );
    }
    if report.crops_detached > 0 {
        println!("  {} crop(s) detached from a missing parent", report.crops_detached);
    }
    for id in &report.skipped {
        warning(&format!("Skipped {}: no audio in legacy store", id));
    }
    for failure in &report.failures {
        warning(failure);
    }
}
