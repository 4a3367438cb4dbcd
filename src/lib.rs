//! # jajan-classify
//!
//! A Rust inference pipeline for classifying photographs of Indonesian
//! traditional snacks ("jajanan pasar") with pretrained image-classification
//! models.
//!
//! ## Features
//!
//! - Idempotent, at-most-once download of remote model artifacts
//! - Two interchangeable runtime back ends behind one `Predictor` contract:
//!   a full-graph ONNX Runtime session and a quantized on-device interpreter
//! - Deterministic preprocessing into a fixed `[1, S, S, 3]` tensor with
//!   explicit, per-variant normalization conventions
//! - Lazy one-shot model initialization that is safe for concurrent
//!   first-time requests
//! - Ranked, labeled results: arg-max class, confidence, stable top-5
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and shared constants
//! * [`artifact`] - Remote artifact fetching and local storage
//! * [`preprocess`] - Image-to-tensor conversion and normalization
//! * [`runtime`] - The `Predictor` trait and the two back ends
//! * [`domain`] - The fixed snack class label contract
//! * [`pipeline`] - The classification pipeline and ranked results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jajan_classify::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = SnackClassifier::new(ModelVariantConfig::resnet50_full())?;
//! let result = classifier.classify_path(Path::new("klepon.jpg"))?;
//! println!("{} ({:.1}%)", result.label, result.confidence_percent());
//! for entry in &result.top_k {
//!     println!("  {} -> {:.4}", entry.label, entry.probability);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Declaring a variant in JSON
//!
//! ```rust
//! use jajan_classify::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config: ModelVariantConfig = serde_json::from_str(
//!     r#"
//! {
//!   "model_name": "snack_mobile",
//!   "source_url": "https://example.com/snack_mobile_quant.onnx",
//!   "artifact_path": "models/snack_mobile_quant.onnx",
//!   "runtime": "QuantizedInterpreter",
//!   "input_size": 224,
//!   "normalization": "MeanCentered"
//! }
//! "#,
//! )?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod core;
pub mod domain;
pub mod pipeline;
pub mod preprocess;
pub mod runtime;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use jajan_classify::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        ClassifyError, ClassifyResult, ModelVariantConfig, Normalization, RuntimeKind,
    };
    pub use crate::domain::snack_labels;
    pub use crate::pipeline::{ClassScore, PipelineState, RankedResult, SnackClassifier};
}

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with an environment filter and formatting
/// layer. Typically called once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
