//! Provisioning progress reporting

use std::fmt;
use std::sync::Arc;

/// Discrete phases of [`crate::ModelProvisioner::ensure_model_ready`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPhase {
    CheckingCache,
    Downloading,
    Validating,
    Extracting,
    Locating,
    Ready,
}

impl fmt::Display for ProvisionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionPhase::CheckingCache => write!(f, "Checking model cache"),
            ProvisionPhase::Downloading => write!(f, "Downloading model"),
            ProvisionPhase::Validating => write!(f, "Validating archive"),
            ProvisionPhase::Extracting => write!(f, "Extracting model"),
            ProvisionPhase::Locating => write!(f, "Locating model directory"),
            ProvisionPhase::Ready => write!(f, "Model ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    Phase(ProvisionPhase),
    /// Bytes written so far; `total` is known when the server sent a length
    Download { downloaded: u64, total: Option<u64> },
}

pub type ProgressCallback = Arc<dyn Fn(ProvisionEvent) + Send + Sync>;

/// Forwards events to an optional callback
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
}

impl Progress {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn phase(&self, phase: ProvisionPhase) {
        tracing::info!("{}", phase);
        self.emit(ProvisionEvent::Phase(phase));
    }

    pub fn download(&self, downloaded: u64, total: Option<u64>) {
        self.emit(ProvisionEvent::Download { downloaded, total });
    }

    fn emit(&self, event: ProvisionEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
