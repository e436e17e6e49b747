//! Turning model output into a labelled, nutrition-annotated result

use crate::error::{SessionError, SessionResult};
use fruitscan_catalog::{Catalog, NutritionRecord, display_name, species_key};
use fruitscan_model_provider::{Classification, ModelLoader, ModelResult};
use fruitscan_types::async_trait;
use fruitscan_types::bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Anything that can classify encoded image bytes
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn classify(&self, image: Bytes) -> ModelResult<Classification>;
}

#[async_trait]
impl Predictor for ModelLoader {
    async fn classify(&self, image: Bytes) -> ModelResult<Classification> {
        self.predict(image).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_index: usize,
    /// Label exactly as the model's class list spells it, e.g. `"Apple 3"`
    pub raw_label: String,
    /// Label with the trailing variant number removed, e.g. `"Apple"`
    pub display_label: String,
    /// First word of the label, e.g. `"Cactus"` for `"Cactus fruit"`. This is
    /// only the fallback lookup key; the nutrition entry that actually matched
    /// is named by `nutrition.species`.
    pub species_key: String,
    /// Probability of the predicted class, 0–100
    pub confidence: f32,
    /// `None` when the nutrition table has no entry for the species
    pub nutrition: Option<NutritionRecord>,
}

impl PredictionResult {
    pub fn from_classification(
        catalog: &Catalog,
        classification: &Classification,
    ) -> SessionResult<Self> {
        let raw_label = catalog
            .label(classification.index)
            .ok_or(SessionError::UnknownClass {
                index: classification.index,
                classes: catalog.num_classes(),
            })?;

        let nutrition = catalog.nutrition_for(raw_label).cloned();
        if nutrition.is_none() {
            tracing::debug!("No nutrition facts for {}", raw_label);
        }

        Ok(Self {
            class_index: classification.index,
            raw_label: raw_label.to_string(),
            display_label: display_name(raw_label),
            species_key: species_key(raw_label).to_string(),
            confidence: classification.confidence,
            nutrition,
        })
    }
}
