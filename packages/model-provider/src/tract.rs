//! ONNX classifier backed by tract

use crate::classifier::{ImageClassifier, ImageTensor};
use crate::config::ClassifierConfig;
use crate::error::{ModelError, ModelResult};
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

/// Optimized, runnable ONNX graph with a fixed `[1, s, s, 3]` input
pub struct TractClassifier {
    plan: Plan,
    input_size: u32,
    path: PathBuf,
}

impl std::fmt::Debug for TractClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractClassifier")
            .field("path", &self.path)
            .field("input_size", &self.input_size)
            .finish()
    }
}

impl TractClassifier {
    /// Loads `model_dir/descriptor`. Blocking, run off the async runtime.
    pub fn load(model_dir: &Path, descriptor: &str, config: ClassifierConfig) -> ModelResult<Self> {
        let path = model_dir.join(descriptor);
        if !path.is_file() {
            return Err(ModelError::load(&path, "model file is missing"));
        }
        let side = config.input_size as usize;

        tracing::info!("Loading model from {}", path.display());
        let plan = tract_onnx::onnx()
            .model_for_path(&path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, side, side, 3]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelError::load(&path, format!("{e:#}")))?;

        Ok(Self {
            plan,
            input_size: config.input_size,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageClassifier for TractClassifier {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn scores(&self, input: &ImageTensor) -> ModelResult<Vec<f32>> {
        if input.size != self.input_size {
            return Err(ModelError::inference(format!(
                "expected a {0}x{0} input, got {1}x{1}",
                self.input_size, input.size
            )));
        }

        let tensor = tract_ndarray::Array4::from_shape_vec(input.shape(), input.data.clone())
            .map_err(|e| ModelError::inference(e.to_string()))?
            .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::inference(format!("{e:#}")))?;
        let output = outputs
            .first()
            .ok_or_else(|| ModelError::inference("model produced no output"))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ModelError::inference(format!("{e:#}")))?;

        Ok(view.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_a_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = TractClassifier::load(tmp.path(), "model.onnx", ClassifierConfig::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
    }

    #[test]
    fn garbage_artifact_is_a_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("model.onnx"), b"not a protobuf graph").unwrap();
        let err = TractClassifier::load(tmp.path(), "model.onnx", ClassifierConfig::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
    }
}
