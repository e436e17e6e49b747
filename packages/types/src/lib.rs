//! Shared re-exports for the FruitScan workspace.
//!
//! Downstream crates pull `Result`, `anyhow!`, the async runtime, the HTTP
//! client and the image codecs from here so every member agrees on one
//! version of each.

pub use anyhow::{Context, Error, Result, anyhow, bail};
pub use async_trait::async_trait;
pub use bytes;
pub use futures;
pub use image;
pub use reqwest;
pub use tokio;

pub mod json {
    pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
    pub use serde_json::{Value, from_slice, from_str, json, to_string, to_string_pretty};
}

pub mod sync {
    pub use std::sync::Arc;
    pub use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
}
