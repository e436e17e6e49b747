//! FruitScan: fruit and vegetable recognition with nutrition facts.
//!
//! The [`Session`] is what a front-end drives. It takes images, asks a
//! [`Predictor`] (normally the [`fruitscan_model_provider::ModelLoader`]) to
//! classify each new one once, and resolves the class against the
//! [`fruitscan_catalog::Catalog`].

pub mod error;
pub mod image;
pub mod prediction;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use image::{ImageInput, ImageSignature, InputSource};
pub use prediction::{PredictionResult, Predictor};
pub use session::{Session, SessionPhase};

pub use fruitscan_catalog as catalog;
pub use fruitscan_model_provider as model;
