//! Per-user session: the current image and the result computed for it

use crate::error::SessionResult;
use crate::image::{ImageInput, ImageSignature};
use crate::prediction::{PredictionResult, Predictor};
use fruitscan_catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoImage,
    NeedsPrediction,
    HasResult,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    NoImage,
    NeedsPrediction(ImageInput),
    HasResult {
        image: ImageInput,
        result: PredictionResult,
    },
}

/// Holds at most one image and its cached prediction.
///
/// Inference for a given signature runs at most once: renders in the
/// `HasResult` phase replay the stored result. A failed prediction keeps the
/// session in `NeedsPrediction`.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::NoImage => SessionPhase::NoImage,
            SessionState::NeedsPrediction(_) => SessionPhase::NeedsPrediction,
            SessionState::HasResult { .. } => SessionPhase::HasResult,
        }
    }

    pub fn image(&self) -> Option<&ImageInput> {
        match &self.state {
            SessionState::NoImage => None,
            SessionState::NeedsPrediction(image) | SessionState::HasResult { image, .. } => {
                Some(image)
            }
        }
    }

    pub fn signature(&self) -> Option<ImageSignature> {
        self.image().map(ImageInput::signature)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            SessionState::HasResult { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Makes `image` the current image. Returns `false` when it has the same
    /// signature as the current one, in which case nothing changes.
    pub fn submit(&mut self, image: ImageInput) -> bool {
        if self.signature() == Some(image.signature()) {
            tracing::debug!("Image {} unchanged, keeping session state", image.signature());
            return false;
        }
        tracing::debug!(
            "New {} image {} ({} bytes)",
            image.source(),
            image.signature(),
            image.len()
        );
        self.state = SessionState::NeedsPrediction(image);
        true
    }

    pub fn clear(&mut self) {
        self.state = SessionState::NoImage;
    }

    /// Produces the result for the current image, running inference only if
    /// no result is cached for its signature.
    pub async fn render(
        &mut self,
        predictor: &dyn Predictor,
        catalog: &Catalog,
    ) -> SessionResult<Option<&PredictionResult>> {
        if let SessionState::NeedsPrediction(image) = &self.state {
            let image = image.clone();
            let classification = predictor.classify(image.bytes().clone()).await?;
            let result = PredictionResult::from_classification(catalog, &classification)?;
            tracing::info!(
                "Predicted {} ({:.1}%) for image {}",
                result.display_label,
                result.confidence,
                image.signature()
            );
            self.state = SessionState::HasResult { image, result };
        }
        Ok(self.result())
    }
}
