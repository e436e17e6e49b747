//! Single-line marker recording the resolved model directory

use crate::scan::has_descriptor;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker file in the cache root holding the absolute model directory path
#[derive(Debug, Clone)]
pub struct ModelMarker {
    path: PathBuf,
}

impl ModelMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory named by the marker, whatever state it is in.
    pub fn read(&self) -> Option<PathBuf> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let line = contents.lines().next()?.trim();
        if line.is_empty() {
            None
        } else {
            Some(PathBuf::from(line))
        }
    }

    /// Directory named by the marker if it still contains `descriptor`.
    ///
    /// A marker pointing at a directory without the descriptor is removed.
    pub fn read_valid(&self, descriptor: &str) -> Option<PathBuf> {
        let dir = self.read()?;
        if has_descriptor(&dir, descriptor) {
            return Some(dir);
        }
        tracing::warn!(
            "Marker {} points to {} which has no {}, discarding it",
            self.path.display(),
            dir.display(),
            descriptor
        );
        self.clear();
        None
    }

    pub fn write(&self, model_dir: &Path) -> io::Result<()> {
        let absolute = std::path::absolute(model_dir)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, absolute.to_string_lossy().as_bytes())
    }

    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed marker {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove marker {}: {}", self.path.display(), e),
        }
    }
}
