//! Submitted images and their content signatures

use crate::error::{SessionError, SessionResult};
use fruitscan_types::bytes::Bytes;
use fruitscan_types::image::{self, ImageFormat};
use fruitscan_types::tokio::fs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// blake3 digest of the full image bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSignature([u8; 32]);

impl ImageSignature {
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ImageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

impl fmt::Debug for ImageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSignature({self})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Upload,
    Camera,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Upload => write!(f, "upload"),
            InputSource::Camera => write!(f, "camera"),
        }
    }
}

/// Encoded image bytes as submitted, with their signature
#[derive(Debug, Clone)]
pub struct ImageInput {
    bytes: Bytes,
    signature: ImageSignature,
    source: InputSource,
    format: ImageFormat,
}

impl ImageInput {
    /// Accepts encoded bytes after sniffing their format.
    ///
    /// Uploads must be JPEG or PNG. Camera frames may use any format the
    /// decoder recognizes.
    pub fn new(bytes: impl Into<Bytes>, source: InputSource) -> SessionResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SessionError::EmptyImage);
        }

        let format = image::guess_format(&bytes)
            .map_err(|_| SessionError::UnsupportedFormat { detected: None })?;
        if source == InputSource::Upload && !matches!(format, ImageFormat::Jpeg | ImageFormat::Png)
        {
            return Err(SessionError::UnsupportedFormat {
                detected: Some(format!("{format:?}")),
            });
        }

        Ok(Self {
            signature: ImageSignature::of(&bytes),
            bytes,
            source,
            format,
        })
    }

    pub async fn from_path(path: &Path, source: InputSource) -> SessionResult<Self> {
        let bytes = fs::read(path).await.map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(bytes, source)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn signature(&self) -> ImageSignature {
        self.signature
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitscan_types::image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 200, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn signature_depends_on_content_not_length() {
        let a = ImageSignature::of(b"abcd");
        let b = ImageSignature::of(b"abce");
        assert_ne!(a, b);
        assert_eq!(a, ImageSignature::of(b"abcd"));
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.to_string().len(), 12);
    }

    #[test]
    fn uploads_accept_jpeg_and_png() {
        let png = ImageInput::new(encode(ImageFormat::Png), InputSource::Upload).unwrap();
        assert_eq!(png.format(), ImageFormat::Png);
        let jpeg = ImageInput::new(encode(ImageFormat::Jpeg), InputSource::Upload).unwrap();
        assert_eq!(jpeg.format(), ImageFormat::Jpeg);
        assert_eq!(jpeg.source(), InputSource::Upload);
    }

    #[test]
    fn uploads_reject_other_formats() {
        let err = ImageInput::new(encode(ImageFormat::Bmp), InputSource::Upload).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedFormat { detected: Some(_) }));

        let err = ImageInput::new(b"hello".to_vec(), InputSource::Upload).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedFormat { detected: None }));

        let err = ImageInput::new(Vec::new(), InputSource::Camera).unwrap_err();
        assert!(matches!(err, SessionError::EmptyImage));
    }

    #[test]
    fn camera_frames_share_the_representation() {
        let bytes = encode(ImageFormat::Png);
        let upload = ImageInput::new(bytes.clone(), InputSource::Upload).unwrap();
        let camera = ImageInput::new(bytes, InputSource::Camera).unwrap();
        assert_eq!(upload.signature(), camera.signature());
        assert_eq!(upload.bytes(), camera.bytes());

        let bmp = ImageInput::new(encode(ImageFormat::Bmp), InputSource::Camera).unwrap();
        assert_eq!(bmp.format(), ImageFormat::Bmp);
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("apple.png");
        std::fs::write(&path, encode(ImageFormat::Png)).unwrap();

        let input = ImageInput::from_path(&path, InputSource::Upload).await.unwrap();
        assert!(!input.is_empty());

        let err = ImageInput::from_path(&tmp.path().join("missing.png"), InputSource::Upload)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Read { .. }));
    }
}
