//! Engine-independent half of inference: image preprocessing, score
//! post-processing and the classifier seam.

use crate::error::{ModelError, ModelResult};
use fruitscan_types::image::{self, imageops::FilterType};

/// NHWC float input, shape `[1, size, size, 3]`, raw 0–255 channel values
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub size: u32,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        let side = self.size as usize;
        [1, side, side, 3]
    }
}

/// Decodes `bytes` and turns them into the tensor layout the model expects.
///
/// The image is converted to RGB and resized to `size`×`size` (Catmull-Rom).
/// Values are left in 0–255, the exported graph owns its normalization.
pub fn preprocess(bytes: &[u8], size: u32) -> ModelResult<ImageTensor> {
    if bytes.is_empty() {
        return Err(ModelError::invalid_image("image is empty"));
    }
    if size == 0 {
        return Err(ModelError::invalid_image("target size must be positive"));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ModelError::invalid_image(format!("could not decode image: {e}")))?;
    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, size, size, FilterType::CatmullRom);

    Ok(ImageTensor {
        size,
        data: resized.into_raw().into_iter().map(f32::from).collect(),
    })
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Outcome of one forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub index: usize,
    pub probabilities: Vec<f32>,
    /// Probability of `index` in percent
    pub confidence: f32,
}

impl Classification {
    pub fn from_scores(scores: &[f32]) -> ModelResult<Self> {
        if scores.is_empty() {
            return Err(ModelError::inference("model returned no scores"));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ModelError::inference("model returned non-finite scores"));
        }

        let probabilities = softmax(scores);
        let (index, best) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        Ok(Self {
            index,
            confidence: best * 100.0,
            probabilities,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.probabilities.len()
    }
}

/// A loaded model able to score a preprocessed image
pub trait ImageClassifier: Send + Sync {
    /// Side length of the square input
    fn input_size(&self) -> u32;

    /// Raw per-class scores for one image.
    fn scores(&self, input: &ImageTensor) -> ModelResult<Vec<f32>>;

    fn predict(&self, bytes: &[u8]) -> ModelResult<Classification> {
        let input = preprocess(bytes, self.input_size())?;
        let scores = self.scores(&input)?;
        Classification::from_scores(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitscan_types::image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn softmax_of_reference_scores() {
        let result = Classification::from_scores(&[2.0, 1.0, 0.0]).unwrap();
        let sum: f32 = result.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(result.index, 0);
        assert!((result.confidence - 66.5).abs() < 0.5);
    }

    #[test]
    fn softmax_is_stable_for_large_scores() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn rejects_unusable_scores() {
        assert!(matches!(
            Classification::from_scores(&[]),
            Err(ModelError::Inference { .. })
        ));
        assert!(matches!(
            Classification::from_scores(&[1.0, f32::NAN]),
            Err(ModelError::Inference { .. })
        ));
    }

    #[test]
    fn preprocess_resizes_to_nhwc() {
        let tensor = preprocess(&png(100, 40, [255, 10, 0]), 64).unwrap();
        assert_eq!(tensor.shape(), [1, 64, 64, 3]);
        assert_eq!(tensor.data.len(), 64 * 64 * 3);
        assert_eq!(&tensor.data[..3], &[255.0, 10.0, 0.0]);
    }

    #[test]
    fn preprocess_rejects_bad_input() {
        assert!(matches!(
            preprocess(&[], 64),
            Err(ModelError::InvalidImage { .. })
        ));
        assert!(matches!(
            preprocess(b"definitely not an image", 64),
            Err(ModelError::InvalidImage { .. })
        ));
    }

    struct Fixed(Vec<f32>);

    impl ImageClassifier for Fixed {
        fn input_size(&self) -> u32 {
            8
        }

        fn scores(&self, input: &ImageTensor) -> ModelResult<Vec<f32>> {
            assert_eq!(input.shape(), [1, 8, 8, 3]);
            Ok(self.0.clone())
        }
    }

    #[test]
    fn default_predict_chains_the_steps() {
        let classifier = Fixed(vec![0.1, 3.0, 0.2]);
        let result = classifier.predict(&png(16, 16, [1, 2, 3])).unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.num_classes(), 3);
    }
}
