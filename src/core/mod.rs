//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components shared by the rest of the
//! crate:
//! - Error handling
//! - Model variant configuration
//! - Constants used throughout the pipeline
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;

pub use config::{ModelVariantConfig, Normalization, RuntimeKind};
pub use constants::*;
pub use errors::{ClassifyError, ClassifyResult, FetchFailure, InvocationFailure};

/// A fixed-shape `[batch, height, width, channels]` floating-point tensor.
///
/// The pipeline always produces batch-of-one NHWC tensors; the type alias
/// keeps signatures readable.
pub type Tensor4D = ndarray::Array4<f32>;
