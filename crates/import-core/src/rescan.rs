//! Folder rescan
//!
//! Re-checks everything beneath a set of folders against the rules, as if
//! every asset inside had just been created.

use crate::catalog::Catalog;
use crate::pipeline::{BatchReport, ChangeSet, Importer};
use crate::Result;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Collect project-relative paths beneath `folders`.
///
/// Includes each folder itself, nested directories except hidden (`.name`)
/// and backup (`name~`) ones, and files except `.meta` sidecars and
/// `.DS_Store`. Folders that do not exist are skipped. Paths use forward
/// slashes and are returned sorted and deduplicated.
pub fn collect_folder_paths<S: AsRef<str>>(root: &Path, folders: &[S]) -> Vec<String> {
    let mut paths = BTreeSet::new();

    for folder in folders {
        let folder = folder.as_ref().replace('\\', "/");
        let folder = folder.trim_end_matches('/');
        let native = root.join(folder);
        if !native.is_dir() {
            tracing::debug!(folder, "Skipping missing folder");
            continue;
        }
        paths.insert(folder.to_string());

        let walker = WalkDir::new(&native)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e));

        for entry in walker.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_file() && (name.ends_with(".meta") || name == ".DS_Store") {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                paths.insert(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    paths.into_iter().collect()
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.ends_with('~')
}

/// Rescan `folders` and run the result as a created-paths batch.
pub fn rescan_folders<S: AsRef<str>>(
    importer: &Importer<'_>,
    root: &Path,
    folders: &[S],
    catalog: &mut dyn Catalog,
) -> Result<BatchReport> {
    let paths = collect_folder_paths(root, folders);
    if paths.is_empty() {
        return Ok(BatchReport::default());
    }
    tracing::info!(count = paths.len(), "Found asset paths to rescan");
    importer.run(&ChangeSet::new().created(paths), catalog)
}
