//! Client for the deepfake prediction service.
//!
//! The CViT model, frame sampling and prediction aggregation run in a
//! separate service. This crate defines the [`ModelLoader`] and
//! [`Predictor`] seams the API depends on, and an HTTP implementation of
//! both.

pub mod client;
pub mod error;
pub mod predictor;
pub mod types;

pub use client::{MlClient, MlClientConfig};
pub use error::{MlError, MlResult};
pub use predictor::{ModelLoader, Predictor};
pub use types::{ModelHandle, PredictionRequest, UNCATEGORIZED_CLASS};
