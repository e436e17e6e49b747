//! Provisioner and classifier configuration
//!
//! Every value has a default; environment variables override them:
//!
//! | variable | field |
//! |---|---|
//! | `FRUITSCAN_MODEL_ID` | [`ProvisionerConfig::remote_id`] |
//! | `FRUITSCAN_MODEL_URL` | [`ProvisionerConfig::url_template`] |
//! | `FRUITSCAN_CACHE_DIR` | [`ProvisionerConfig::cache_root`] |
//! | `FRUITSCAN_BUNDLED_MODEL_DIR` | [`ProvisionerConfig::bundled_dir`] |
//! | `FRUITSCAN_MODEL_DESCRIPTOR` | [`ProvisionerConfig::descriptor_file`] |
//! | `FRUITSCAN_INPUT_SIZE` | [`ClassifierConfig::input_size`] |

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://drive.usercontent.google.com/download?id={id}&export=download&confirm=t";
pub const DEFAULT_DESCRIPTOR: &str = "model.onnx";
pub const DEFAULT_ARCHIVE_NAME: &str = "model.zip";
pub const DEFAULT_MARKER_NAME: &str = ".model_dir_path";
pub const DEFAULT_INPUT_SIZE: u32 = 64;

/// Where the model comes from and where it is cached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Stable identifier of the archive on the file host
    #[serde(default)]
    pub remote_id: Option<String>,
    /// Download URL with an `{id}` placeholder
    #[serde(default = "default_url_template")]
    pub url_template: String,
    /// Dedicated directory for the archive, the extracted tree and the marker
    pub cache_root: PathBuf,
    /// Directory that may hold a model shipped next to the application
    #[serde(default)]
    pub bundled_dir: Option<PathBuf>,
    /// File whose presence marks a complete model directory
    #[serde(default = "default_descriptor")]
    pub descriptor_file: String,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    #[serde(default = "default_marker_name")]
    pub marker_name: String,
}

fn default_url_template() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}

fn default_descriptor() -> String {
    DEFAULT_DESCRIPTOR.to_string()
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

fn default_marker_name() -> String {
    DEFAULT_MARKER_NAME.to_string()
}

fn default_cache_root() -> PathBuf {
    dirs_next::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("fruitscan")
        .join("model")
}

fn executable_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            remote_id: None,
            url_template: default_url_template(),
            cache_root: default_cache_root(),
            bundled_dir: executable_dir(),
            descriptor_file: default_descriptor(),
            archive_name: default_archive_name(),
            marker_name: default_marker_name(),
        }
    }
}

impl ProvisionerConfig {
    /// Config rooted at `cache_root`, without bundled model or remote id.
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            bundled_dir: None,
            ..Self::default()
        }
    }

    pub fn from_env() -> ModelResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, defaults for missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ModelResult<Self> {
        let mut config = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(id) = non_empty("FRUITSCAN_MODEL_ID") {
            config.remote_id = Some(id);
        }
        if let Some(template) = non_empty("FRUITSCAN_MODEL_URL") {
            if !template.contains("{id}") {
                return Err(ModelError::config(
                    "FRUITSCAN_MODEL_URL",
                    "template must contain an {id} placeholder",
                ));
            }
            config.url_template = template;
        }
        if let Some(dir) = non_empty("FRUITSCAN_CACHE_DIR") {
            config.cache_root = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty("FRUITSCAN_BUNDLED_MODEL_DIR") {
            config.bundled_dir = Some(PathBuf::from(dir));
        }
        if let Some(descriptor) = non_empty("FRUITSCAN_MODEL_DESCRIPTOR") {
            if descriptor.contains(['/', '\\']) {
                return Err(ModelError::config(
                    "FRUITSCAN_MODEL_DESCRIPTOR",
                    "must be a bare file name",
                ));
            }
            config.descriptor_file = descriptor;
        }
        Ok(config)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.cache_root.join(&self.archive_name)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.cache_root.join(&self.marker_name)
    }

    /// Download URL for the configured remote id.
    pub fn download_url(&self) -> ModelResult<String> {
        let id = self.remote_id.as_deref().ok_or_else(|| {
            ModelError::config(
                "FRUITSCAN_MODEL_ID",
                "no remote model id configured and no local model found",
            )
        })?;
        Ok(self.url_template.replace("{id}", id))
    }
}

/// Preprocessing contract of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Side length of the square RGB input the model was trained on
    pub input_size: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> ModelResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ModelResult<Self> {
        let input_size = match lookup("FRUITSCAN_INPUT_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| {
                    ModelError::config("FRUITSCAN_INPUT_SIZE", "expected a positive integer")
                })?,
            None => DEFAULT_INPUT_SIZE,
        };
        Ok(Self { input_size })
    }
}
