//! Locating the model root inside an extracted tree

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Picks the directory holding `descriptor` out of a file listing.
///
/// The shallowest match wins; among equally deep matches the one listed
/// first. Pure function, the listing can come from anywhere.
pub fn find_model_dir_in<I, P>(listing: I, descriptor: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut best: Option<(usize, PathBuf)> = None;
    for path in listing {
        let path = path.as_ref();
        if path.file_name().is_none_or(|name| name != descriptor) {
            continue;
        }
        let Some(dir) = path.parent() else {
            continue;
        };
        let depth = dir.components().count();
        if best.as_ref().is_none_or(|(best_depth, _)| depth < *best_depth) {
            best = Some((depth, dir.to_path_buf()));
        }
    }
    best.map(|(_, dir)| dir)
}

/// Walks `root` recursively and returns the directory that holds `descriptor`.
///
/// Only regular files count; symlinks are not followed.
pub fn find_model_dir(root: &Path, descriptor: &str) -> Option<PathBuf> {
    let files = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry while scanning: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path());

    find_model_dir_in(files, descriptor)
}

/// Whether `dir` directly contains `descriptor` as a regular file.
pub fn has_descriptor(dir: &Path, descriptor: &str) -> bool {
    dir.join(descriptor).is_file()
}
