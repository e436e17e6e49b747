//! Zip validation and contained extraction
//!
//! Entry names are untrusted input. Every entry is resolved against the
//! extraction root by hand (no reliance on the zip crate's own sanitizing) and
//! the whole archive is checked before the first byte is written.

use crate::error::{ModelError, ModelResult};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const ZIP_LOCAL_HEADER: &[u8; 4] = b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: &[u8; 4] = b"PK\x05\x06";
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// What an extraction wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
    /// Every file this extraction created, as `dest` joined with the entry path
    pub written: Vec<PathBuf>,
}

/// Checks that `path` is a readable, non-empty zip archive.
///
/// Returns the number of entries. Nothing is extracted.
pub fn validate_archive(path: &Path) -> ModelResult<usize> {
    let mut file = File::open(path).map_err(|e| ModelError::invalid_archive(path, e.to_string()))?;

    let mut head = [0u8; 512];
    let read = read_up_to(&mut file, &mut head)?;
    let head = &head[..read];
    if head.len() < 4 || (&head[..4] != ZIP_LOCAL_HEADER && &head[..4] != ZIP_EMPTY_ARCHIVE) {
        return Err(ModelError::invalid_archive(path, describe_non_zip(head)));
    }

    let file = File::open(path)?;
    let archive =
        ZipArchive::new(file).map_err(|e| ModelError::invalid_archive(path, e.to_string()))?;
    if archive.is_empty() {
        return Err(ModelError::invalid_archive(path, "archive has no entries"));
    }
    Ok(archive.len())
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn describe_non_zip(head: &[u8]) -> String {
    if head.is_empty() {
        return "file is empty".to_string();
    }
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    let trimmed = text.trim_start();
    if trimmed.starts_with("<!doctype html") || trimmed.starts_with("<html") {
        "received an HTML page instead of an archive (is the file shared publicly?)".to_string()
    } else {
        "missing zip signature".to_string()
    }
}

/// Resolves an archive entry name to its output path under `root`.
///
/// `root` must already be absolute. The resolution is purely lexical:
/// backslashes count as separators, `.` is ignored, `..` pops a component and
/// may never climb above `root`. Absolute names and drive prefixes are rejected.
pub fn resolve_entry_path(root: &Path, name: &str) -> ModelResult<PathBuf> {
    let normalized = name.replace('\\', "/");

    if normalized.trim().is_empty() {
        return Err(ModelError::unsafe_path(name, "empty entry name"));
    }
    if normalized.contains('\0') {
        return Err(ModelError::unsafe_path(name, "NUL byte in entry name"));
    }
    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return Err(ModelError::unsafe_path(name, "absolute path"));
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for part in normalized.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if depth == 0 {
                    return Err(ModelError::unsafe_path(name, "escapes the extraction root"));
                }
                resolved.pop();
                depth -= 1;
            }
            part if part.contains(':') => {
                return Err(ModelError::unsafe_path(name, "drive or stream separator in path"));
            }
            part => {
                resolved.push(part);
                depth += 1;
            }
        }
    }

    if !resolved.starts_with(root) {
        return Err(ModelError::unsafe_path(name, "escapes the extraction root"));
    }
    Ok(resolved)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

struct PlannedEntry {
    index: usize,
    target: PathBuf,
    relative: PathBuf,
    is_dir: bool,
}

/// Extracts `archive_path` into `dest`, refusing any entry that would land
/// outside of it.
///
/// Symbolic-link entries are refused outright. Every target is checked
/// against what already exists on disk before the first write, so a
/// directory that resolves outside `dest` (e.g. a planted symlink) aborts
/// the extraction with nothing created.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> ModelResult<ExtractSummary> {
    fs::create_dir_all(dest)?;
    let root = dest.canonicalize()?;

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| ModelError::invalid_archive(archive_path, e.to_string()))?;

    let mut plan = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| ModelError::invalid_archive(archive_path, e.to_string()))?;
        let name = entry.name().to_string();

        if entry
            .unix_mode()
            .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
        {
            return Err(ModelError::unsafe_path(name, "symbolic links are not allowed"));
        }

        let is_dir = entry.is_dir() || name.ends_with('/') || name.ends_with('\\');
        let target = resolve_entry_path(&root, &name)?;
        if target == root && !is_dir {
            return Err(ModelError::unsafe_path(
                name,
                "file entry resolves to the extraction root",
            ));
        }

        let dir = if is_dir {
            target.as_path()
        } else {
            target.parent().unwrap_or(&root)
        };
        ensure_within(&root, dir)?;
        if !is_dir && is_symlink(&target) {
            return Err(ModelError::unsafe_path(
                name,
                "destination is an existing symbolic link",
            ));
        }

        let relative = target.strip_prefix(&root).unwrap_or(&target).to_path_buf();
        plan.push(PlannedEntry {
            index,
            target,
            relative,
            is_dir,
        });
    }

    let mut summary = ExtractSummary::default();
    for planned in plan {
        if planned.is_dir {
            create_dirs_within(&root, &planned.target)?;
            summary.dirs += 1;
            continue;
        }

        create_dirs_within(&root, planned.target.parent().unwrap_or(&root))?;
        if is_symlink(&planned.target) {
            return Err(ModelError::unsafe_path(
                planned.target.display().to_string(),
                "destination is an existing symbolic link",
            ));
        }

        let mut entry = archive
            .by_index(planned.index)
            .map_err(|e| ModelError::invalid_archive(archive_path, e.to_string()))?;
        let mut out = File::create(&planned.target)?;
        summary.bytes += io::copy(&mut entry, &mut out)?;
        summary.files += 1;
        summary.written.push(dest.join(&planned.relative));
    }

    tracing::info!(
        "Extracted {} files ({} bytes) into {}",
        summary.files,
        summary.bytes,
        root.display()
    );
    Ok(summary)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

/// Fails when the deepest part of `path` that already exists, with symlinks
/// resolved, is not inside `root`. Nothing is created.
fn ensure_within(root: &Path, path: &Path) -> ModelResult<()> {
    let mut existing = path;
    while fs::symlink_metadata(existing).is_err() {
        match existing.parent() {
            Some(parent) => existing = parent,
            None => break,
        }
    }

    let real = existing.canonicalize().map_err(|e| {
        ModelError::unsafe_path(
            path.display().to_string(),
            format!("cannot resolve {}: {}", existing.display(), e),
        )
    })?;
    if real.starts_with(root) {
        Ok(())
    } else {
        Err(ModelError::unsafe_path(
            path.display().to_string(),
            format!("resolves outside the extraction root to {}", real.display()),
        ))
    }
}

/// Creates `dir` one component at a time below `root`, refusing to step
/// through a symbolic link.
fn create_dirs_within(root: &Path, dir: &Path) -> ModelResult<()> {
    let relative = dir.strip_prefix(root).map_err(|_| {
        ModelError::unsafe_path(dir.display().to_string(), "escapes the extraction root")
    })?;

    let mut current = root.to_path_buf();
    for part in relative.components() {
        current.push(part);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(ModelError::unsafe_path(
                    current.display().to_string(),
                    "directory is a symbolic link",
                ));
            }
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ModelError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", current.display()),
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir(&current)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
