//! Model provisioning: marker fast path, bundled model, or download and extract

use crate::archive::{extract_archive, validate_archive};
use crate::config::ProvisionerConfig;
use crate::error::{ModelError, ModelResult};
use crate::fetch::{ArchiveFetcher, HttpFetcher};
use crate::marker::ModelMarker;
use crate::progress::{Progress, ProvisionPhase};
use crate::scan::{find_model_dir_in, has_descriptor};
use fruitscan_types::sync::Arc;
use fruitscan_types::tokio::{fs, task};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// How the model directory was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Marker,
    Bundled,
    Downloaded,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Marker => write!(f, "cached"),
            ModelSource::Bundled => write!(f, "bundled"),
            ModelSource::Downloaded => write!(f, "downloaded"),
        }
    }
}

/// A directory that contains the model descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocation {
    pub dir: PathBuf,
    pub source: ModelSource,
}

pub struct ModelProvisioner {
    config: ProvisionerConfig,
    fetcher: Arc<dyn ArchiveFetcher>,
    progress: Progress,
}

impl fmt::Debug for ModelProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProvisioner")
            .field("config", &self.config)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl ModelProvisioner {
    /// Provisioner downloading over HTTP.
    pub fn new(config: ProvisionerConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(config: ProvisionerConfig, fetcher: Arc<dyn ArchiveFetcher>) -> Self {
        Self {
            config,
            fetcher,
            progress: Progress::none(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    fn marker(&self) -> ModelMarker {
        ModelMarker::new(self.config.marker_path())
    }

    /// Returns a directory containing the model descriptor, downloading and
    /// extracting the archive only when neither the marker nor a bundled copy
    /// can be used.
    pub async fn ensure_model_ready(&self) -> ModelResult<ModelLocation> {
        let descriptor = self.config.descriptor_file.as_str();
        self.progress.phase(ProvisionPhase::CheckingCache);

        if let Some(dir) = self.marker().read_valid(descriptor) {
            tracing::debug!("Model cache hit: {}", dir.display());
            return Ok(self.ready(dir, ModelSource::Marker));
        }

        if let Some(bundled) = &self.config.bundled_dir {
            if has_descriptor(bundled, descriptor) {
                tracing::debug!("Using bundled model at {}", bundled.display());
                return Ok(self.ready(bundled.clone(), ModelSource::Bundled));
            }
        }

        let dir = self.download_and_extract().await?;
        Ok(self.ready(dir, ModelSource::Downloaded))
    }

    fn ready(&self, dir: PathBuf, source: ModelSource) -> ModelLocation {
        self.progress.phase(ProvisionPhase::Ready);
        tracing::info!("Model directory ({}): {}", source, dir.display());
        ModelLocation { dir, source }
    }

    async fn download_and_extract(&self) -> ModelResult<PathBuf> {
        let url = self.config.download_url()?;
        let cache_root = self.config.cache_root.clone();
        let archive_path = self.config.archive_path();
        let descriptor = self.config.descriptor_file.clone();

        fs::create_dir_all(&cache_root).await?;
        remove_if_exists(&archive_path).await?;

        self.progress.phase(ProvisionPhase::Downloading);
        let fetched = self.fetcher.fetch(&url, &archive_path, &self.progress).await;
        if let Err(err) = fetched {
            discard_archive(&archive_path).await;
            return Err(err);
        }

        self.progress.phase(ProvisionPhase::Validating);
        let validation = {
            let archive_path = archive_path.clone();
            blocking(move || validate_archive(&archive_path)).await
        };
        match validation {
            Ok(entries) => tracing::debug!("Archive holds {} entries", entries),
            Err(err) => {
                discard_archive(&archive_path).await;
                return Err(err);
            }
        }

        self.progress.phase(ProvisionPhase::Extracting);
        let summary = {
            let archive_path = archive_path.clone();
            let cache_root = cache_root.clone();
            blocking(move || extract_archive(&archive_path, &cache_root)).await?
        };

        // Only files from this archive count; leftovers in the cache root do not.
        self.progress.phase(ProvisionPhase::Locating);
        let found = find_model_dir_in(&summary.written, &descriptor);

        let marker = self.marker();
        let Some(dir) = found else {
            marker.clear();
            return Err(ModelError::DescriptorNotFound {
                descriptor,
                root: cache_root,
            });
        };

        if let Err(e) = marker.write(&dir) {
            tracing::warn!(
                "Could not persist model location to {}: {}",
                marker.path().display(),
                e
            );
        }
        Ok(dir)
    }
}

async fn blocking<T, F>(f: F) -> ModelResult<T>
where
    F: FnOnce() -> ModelResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| ModelError::Io(io::Error::other(e)))?
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

async fn discard_archive(path: &Path) {
    if let Err(e) = remove_if_exists(path).await {
        tracing::warn!("Failed to remove rejected archive {}: {}", path.display(), e);
    }
}
