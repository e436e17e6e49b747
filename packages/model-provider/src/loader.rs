//! Lazily loaded, shared classifier handle

use crate::classifier::{Classification, ImageClassifier};
use crate::config::ClassifierConfig;
use crate::error::{ModelError, ModelResult};
use crate::provisioner::{ModelLocation, ModelProvisioner};
use crate::tract::TractClassifier;
use fruitscan_types::bytes::Bytes;
use fruitscan_types::sync::{Arc, Mutex};
use fruitscan_types::tokio::task;
use std::io;
use std::path::Path;

/// Turns a provisioned model directory into a runnable classifier
pub type ClassifierFactory =
    Arc<dyn Fn(&Path, ClassifierConfig) -> ModelResult<Arc<dyn ImageClassifier>> + Send + Sync>;

enum LoadState {
    NotLoaded,
    Loaded {
        classifier: Arc<dyn ImageClassifier>,
        location: ModelLocation,
    },
    Failed(String),
}

/// Owns the model handle for the lifetime of the application.
///
/// The first [`ModelLoader::load`] provisions and deserializes the model, later
/// calls reuse the handle. A failed attempt is remembered: the loader keeps
/// reporting [`ModelError::Unavailable`] until [`ModelLoader::reset`].
pub struct ModelLoader {
    provisioner: ModelProvisioner,
    config: ClassifierConfig,
    factory: ClassifierFactory,
    expected_classes: Option<usize>,
    state: Mutex<LoadState>,
}

impl ModelLoader {
    /// Loader using the tract ONNX engine.
    pub fn new(provisioner: ModelProvisioner, config: ClassifierConfig) -> Self {
        let descriptor = provisioner.config().descriptor_file.clone();
        let factory: ClassifierFactory = Arc::new(move |dir: &Path, config: ClassifierConfig| {
            let classifier = TractClassifier::load(dir, &descriptor, config)?;
            Ok(Arc::new(classifier) as Arc<dyn ImageClassifier>)
        });
        Self::with_factory(provisioner, config, factory)
    }

    pub fn with_factory(
        provisioner: ModelProvisioner,
        config: ClassifierConfig,
        factory: ClassifierFactory,
    ) -> Self {
        Self {
            provisioner,
            config,
            factory,
            expected_classes: None,
            state: Mutex::new(LoadState::NotLoaded),
        }
    }

    /// Rejects score vectors whose length differs from `classes`.
    pub fn with_expected_classes(mut self, classes: usize) -> Self {
        self.expected_classes = Some(classes);
        self
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    pub async fn load(&self) -> ModelResult<Arc<dyn ImageClassifier>> {
        let mut state = self.state.lock().await;
        match &*state {
            LoadState::Loaded { classifier, .. } => return Ok(classifier.clone()),
            LoadState::Failed(reason) => {
                return Err(ModelError::Unavailable {
                    reason: reason.clone(),
                });
            }
            LoadState::NotLoaded => {}
        }

        match self.load_fresh().await {
            Ok((classifier, location)) => {
                *state = LoadState::Loaded {
                    classifier: classifier.clone(),
                    location,
                };
                Ok(classifier)
            }
            Err(err) => {
                tracing::error!("Model load failed: {}", err);
                *state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    async fn load_fresh(&self) -> ModelResult<(Arc<dyn ImageClassifier>, ModelLocation)> {
        let location = self.provisioner.ensure_model_ready().await?;
        let factory = self.factory.clone();
        let config = self.config;
        let dir = location.dir.clone();
        let classifier = task::spawn_blocking(move || factory(&dir, config))
            .await
            .map_err(|e| ModelError::Io(io::Error::other(e)))??;
        Ok((classifier, location))
    }

    /// Forgets a previous failure so the next [`ModelLoader::load`] starts over.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, LoadState::Failed(_)) {
            tracing::info!("Resetting failed model loader");
            *state = LoadState::NotLoaded;
        }
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().await, LoadState::Loaded { .. })
    }

    /// Where the loaded model came from, once loaded.
    pub async fn location(&self) -> Option<ModelLocation> {
        match &*self.state.lock().await {
            LoadState::Loaded { location, .. } => Some(location.clone()),
            _ => None,
        }
    }

    /// Loads the model if needed and classifies `image`.
    pub async fn predict(&self, image: Bytes) -> ModelResult<Classification> {
        let classifier = self.load().await?;
        let classification = task::spawn_blocking(move || classifier.predict(&image))
            .await
            .map_err(|e| ModelError::Io(io::Error::other(e)))??;

        if let Some(expected) = self.expected_classes {
            if classification.num_classes() != expected {
                return Err(ModelError::inference(format!(
                    "model returned {} scores, expected {}",
                    classification.num_classes(),
                    expected
                )));
            }
        }
        Ok(classification)
    }
}
