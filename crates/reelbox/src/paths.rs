//! # Path Resolver
//!
//! Maps logical folders to directory paths under the library root and guards
//! structural invariants before a move is committed.
//!
//! A folder's disk path is the ordered list of folder names from the root down
//! to it. Recordings live in the directory of their folder; the
//! [`UNCATEGORIZED`](crate::model::UNCATEGORIZED) sentinel maps to the root
//! itself (the empty path).
//!
//! Everything here is a pure function over the current folder list: no I/O,
//! no mutation. Walks up the parent chain are bounded by [`MAX_DEPTH`] so a
//! corrupt index (a cycle at rest) cannot hang a caller.

use crate::model::{is_uncategorized, Folder, Recording};
use std::collections::{HashMap, HashSet};

pub const MAX_DEPTH: usize = 1000;

fn by_id(folders: &[Folder]) -> HashMap<&str, &Folder> {
    folders.iter().map(|f| (f.id.as_str(), f)).collect()
}

/// Names from the root down to `folder_id`.
///
/// A parent id that no longer resolves ends the walk as if the root had been
/// reached.
pub fn folder_path(folder_id: Option<&str>, folders: &[Folder]) -> Vec<String> {
    if is_uncategorized(folder_id) {
        return Vec::new();
    }
    let lookup = by_id(folders);
    let mut path = Vec::new();
    let mut current = folder_id;
    let mut seen = HashSet::new();

    while let Some(id) = current {
        if path.len() >= MAX_DEPTH || !seen.insert(id) {
            break;
        }
        let Some(folder) = lookup.get(id) else {
            break;
        };
        path.push(folder.name.clone());
        current = folder.parent_id.as_deref();
    }

    path.reverse();
    path
}

/// Directory where a recording's file is expected to live.
pub fn recording_path(recording: &Recording, folders: &[Folder]) -> Vec<String> {
    folder_path(recording.folder(), folders)
}

/// Would re-parenting `moving_id` under `proposed_parent` make it its own ancestor?
pub fn would_create_cycle(
    moving_id: &str,
    proposed_parent: Option<&str>,
    folders: &[Folder],
) -> bool {
    let lookup = by_id(folders);
    let mut current = proposed_parent;
    let mut steps = 0;

    while let Some(id) = current {
        if id == moving_id {
            return true;
        }
        steps += 1;
        if steps > MAX_DEPTH {
            // A chain this long is already corrupt; refuse to extend it.
            return true;
        }
        current = lookup.get(id).and_then(|f| f.parent_id.as_deref());
    }
    false
}

/// Number of ancestors of `folder_id` plus one; root-level folders have depth 1.
pub fn folder_depth(folder_id: &str, folders: &[Folder]) -> usize {
    folder_path(Some(folder_id), folders).len()
}

/// Ids of every folder below `folder_id`, parents before children.
pub fn descendant_ids(folder_id: &str, folders: &[Folder]) -> Vec<String> {
    let mut result = Vec::new();
    let mut queue = vec![folder_id.to_string()];
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(folder_id.to_string());

    while !queue.is_empty() {
        let mut next = Vec::new();
        for parent in &queue {
            for child in folders
                .iter()
                .filter(|f| f.parent_id.as_deref() == Some(parent.as_str()))
            {
                if seen.insert(child.id.clone()) {
                    result.push(child.id.clone());
                    next.push(child.id.clone());
                }
            }
        }
        queue = next;
    }
    result
}

/// True if any folder's parent chain loops back on itself.
pub fn has_cycle(folders: &[Folder]) -> bool {
    let lookup = by_id(folders);
    folders.iter().any(|folder| {
        let mut seen = HashSet::new();
        let mut current = Some(folder.id.as_str());
        while let Some(id) = current {
            if !seen.insert(id) {
                return true;
            }
            current = lookup.get(id).and_then(|f| f.parent_id.as_deref());
        }
        false
    })
}
