//! Error types for model acquisition, loading and inference

use std::path::PathBuf;
use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Coarse classification of a [`ModelError`], used by front-ends to decide
/// what to show in place of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Getting the model onto local storage failed
    Acquisition,
    /// The model is on disk but could not be turned into a runnable handle
    Load,
    /// The caller handed in something the model cannot consume
    Input,
    /// The model ran but produced something unusable
    Inference,
}

/// Errors that can occur while provisioning or running the classifier
#[derive(Error, Debug)]
pub enum ModelError {
    /// Fetching the archive from the remote source failed
    #[error("Download of {url} failed: {message}")]
    Download {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The downloaded file is not a readable zip archive
    #[error("Downloaded file {} is not a valid zip archive: {message}", path.display())]
    InvalidArchive { path: PathBuf, message: String },

    /// An archive entry would be written outside the extraction root
    #[error("Unsafe archive entry rejected: {entry} ({reason})")]
    UnsafeArchivePath { entry: String, reason: String },

    /// Extraction succeeded but no directory contains the model descriptor
    #[error("Model package is corrupt: {descriptor} not found under {}", root.display())]
    DescriptorNotFound { descriptor: String, root: PathBuf },

    /// The model artifact exists but could not be deserialized
    #[error("Failed to load model from {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// A previous load attempt failed and has not been reset
    #[error("Model unavailable: {reason}")]
    Unavailable { reason: String },

    /// The input image was rejected before reaching the model
    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    /// Running the model failed or produced unusable output
    #[error("Inference error: {message}")]
    Inference { message: String },

    /// Configuration value could not be used
    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Download {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn download_with_source(
        url: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ModelError::Download {
            url: url.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModelError::InvalidArchive {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsafe_path(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::UnsafeArchivePath {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModelError::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_image(message: impl Into<String>) -> Self {
        ModelError::InvalidImage {
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ModelError::Inference {
            message: message.into(),
        }
    }

    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Download { .. }
            | ModelError::InvalidArchive { .. }
            | ModelError::UnsafeArchivePath { .. }
            | ModelError::DescriptorNotFound { .. }
            | ModelError::Config { .. }
            | ModelError::Io(_) => ErrorKind::Acquisition,
            ModelError::Load { .. } | ModelError::Unavailable { .. } => ErrorKind::Load,
            ModelError::InvalidImage { .. } => ErrorKind::Input,
            ModelError::Inference { .. } => ErrorKind::Inference,
        }
    }

    /// Whether the error is a path-containment violation in an archive
    pub fn is_security_violation(&self) -> bool {
        matches!(self, ModelError::UnsafeArchivePath { .. })
    }
}
