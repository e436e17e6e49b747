pub mod archive;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod marker;
pub mod progress;
pub mod provisioner;
pub mod scan;
pub mod tract;

pub use classifier::{Classification, ImageClassifier, ImageTensor, preprocess, softmax};
pub use config::{ClassifierConfig, ProvisionerConfig};
pub use error::{ErrorKind, ModelError, ModelResult};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use loader::{ClassifierFactory, ModelLoader};
pub use progress::{Progress, ProgressCallback, ProvisionEvent, ProvisionPhase};
pub use provisioner::{ModelLocation, ModelProvisioner, ModelSource};
pub use tract::TractClassifier;
