use fruitscan_model_provider::{ErrorKind, ModelError};
use std::path::PathBuf;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image has been submitted")]
    NoImage,

    #[error("Image is empty")]
    EmptyImage,

    #[error("Unsupported image format{}, expected JPEG or PNG", detected_suffix(.detected))]
    UnsupportedFormat { detected: Option<String> },

    #[error("Failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model predicted an index the label table does not know
    #[error("Model predicted class {index}, but only {classes} labels are known")]
    UnknownClass { index: usize, classes: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl SessionError {
    /// Error category as seen by the model layer, if the error came from there.
    pub fn model_kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::Model(err) => Some(err.kind()),
            SessionError::UnknownClass { .. } => Some(ErrorKind::Inference),
            _ => None,
        }
    }

    /// Whether the model could not be provisioned or loaded at all.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self.model_kind(),
            Some(ErrorKind::Acquisition) | Some(ErrorKind::Load)
        )
    }
}

fn detected_suffix(detected: &Option<String>) -> String {
    detected
        .as_deref()
        .map(|format| format!(" ({format})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_what_was_detected() {
        let gif = SessionError::UnsupportedFormat {
            detected: Some("Gif".into()),
        };
        assert_eq!(
            gif.to_string(),
            "Unsupported image format (Gif), expected JPEG or PNG"
        );
        let unknown = SessionError::UnsupportedFormat { detected: None };
        assert_eq!(
            unknown.to_string(),
            "Unsupported image format, expected JPEG or PNG"
        );
    }
}
