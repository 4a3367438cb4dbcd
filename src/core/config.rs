//! Model variant configuration.
//!
//! A model variant binds together everything the pipeline needs to know
//! about one artifact: where to fetch it from, where to store it, which
//! runtime back end loads it, the input resolution it was trained with, and
//! the normalization convention it expects. Normalization is a required,
//! explicit parameter of the variant and is never inferred from the artifact.

use crate::core::constants::{DEFAULT_INPUT_SIZE, DEFAULT_TOP_K};
use crate::core::errors::ClassifyError;
use std::path::PathBuf;

/// The runtime back end a model artifact is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RuntimeKind {
    /// A serialized full computation graph executed by ONNX Runtime.
    FullGraph,
    /// A precompiled mobile-inference graph executed by an on-device
    /// interpreter with explicit buffer allocation.
    QuantizedInterpreter,
}

/// The normalization convention applied during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Normalization {
    /// Raw intensity divided by 255.
    UnitScale,
    /// Per-channel mean subtraction and variance scaling with the ImageNet
    /// statistics.
    MeanCentered,
}

/// Configuration for one model variant.
///
/// The input size and normalization convention must match exactly what the
/// artifact was trained with; a mismatch produces meaningless predictions
/// without an error, which is why both are required fields here rather than
/// defaults discovered at load time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelVariantConfig {
    /// Name used in logs and error messages.
    pub model_name: String,
    /// Remote location the artifact is downloaded from if absent locally.
    pub source_url: String,
    /// Local path the artifact is stored at.
    pub artifact_path: PathBuf,
    /// The runtime back end for this variant.
    pub runtime: RuntimeKind,
    /// Square input resolution the model expects (e.g. 224 or 256).
    pub input_size: u32,
    /// Normalization convention the model was trained with.
    pub normalization: Normalization,
    /// Optional expected artifact size in bytes. When set, a downloaded body
    /// whose byte count differs is rejected before anything is written.
    #[serde(default)]
    pub expected_len: Option<u64>,
    /// Number of ranked entries to report. Defaults to 5.
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl ModelVariantConfig {
    /// The full-graph ResNet-50 variant observed in production: 224x224
    /// input with plain 0-1 scaling.
    pub fn resnet50_full() -> Self {
        Self {
            model_name: "snack_resnet50".to_string(),
            source_url:
                "https://huggingface.co/zakialfadilah/best_model_resnet50/resolve/main/best_model_resnet50.onnx"
                    .to_string(),
            artifact_path: PathBuf::from("models/best_model_resnet50.onnx"),
            runtime: RuntimeKind::FullGraph,
            input_size: DEFAULT_INPUT_SIZE,
            normalization: Normalization::UnitScale,
            expected_len: None,
            top_k: Some(DEFAULT_TOP_K),
        }
    }

    /// The quantized on-device variant: 224x224 input with mean-centered
    /// channel preprocessing.
    pub fn mobile_quantized() -> Self {
        Self {
            model_name: "snack_mobile".to_string(),
            source_url:
                "https://huggingface.co/zakialfadilah/best_model_resnet50/resolve/main/snack_mobile_quant.onnx"
                    .to_string(),
            artifact_path: PathBuf::from("models/snack_mobile_quant.onnx"),
            runtime: RuntimeKind::QuantizedInterpreter,
            input_size: DEFAULT_INPUT_SIZE,
            normalization: Normalization::MeanCentered,
            expected_len: None,
            top_k: Some(DEFAULT_TOP_K),
        }
    }

    /// Sets the local artifact path.
    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// Sets the remote source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Sets the square input resolution (e.g.
    /// [`crate::core::constants::ALT_INPUT_SIZE`] for the 256x256 variants).
    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    /// Sets the expected artifact size in bytes.
    pub fn with_expected_len(mut self, len: u64) -> Self {
        self.expected_len = Some(len);
        self
    }

    /// Sets the number of ranked entries to report.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Validates the model variant configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the model name, source URL, or artifact
    /// path is empty, if the input size is zero, or if `top_k` is zero.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.model_name.trim().is_empty() {
            return Err(ClassifyError::config_error("model_name must not be empty"));
        }
        if self.source_url.trim().is_empty() {
            return Err(ClassifyError::config_error("source_url must not be empty"));
        }
        if self.artifact_path.as_os_str().is_empty() {
            return Err(ClassifyError::config_error(
                "artifact_path must not be empty",
            ));
        }
        if self.input_size == 0 {
            return Err(ClassifyError::config_error(
                "input_size must be greater than 0",
            ));
        }
        if self.top_k == Some(0) {
            return Err(ClassifyError::config_error("top_k must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(ModelVariantConfig::resnet50_full().validate().is_ok());
        assert!(ModelVariantConfig::mobile_quantized().validate().is_ok());
    }

    #[test]
    fn preset_conventions_match_the_observed_variants() {
        let full = ModelVariantConfig::resnet50_full();
        assert_eq!(full.runtime, RuntimeKind::FullGraph);
        assert_eq!(full.normalization, Normalization::UnitScale);
        assert_eq!(full.input_size, 224);

        let mobile = ModelVariantConfig::mobile_quantized();
        assert_eq!(mobile.runtime, RuntimeKind::QuantizedInterpreter);
        assert_eq!(mobile.normalization, Normalization::MeanCentered);
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let mut config = ModelVariantConfig::resnet50_full();
        config.source_url = String::new();
        assert!(config.validate().is_err());

        let config = ModelVariantConfig::resnet50_full().with_input_size(0);
        assert!(config.validate().is_err());

        let config = ModelVariantConfig::resnet50_full().with_top_k(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        use crate::core::constants::ALT_INPUT_SIZE;

        let config = ModelVariantConfig::mobile_quantized()
            .with_input_size(ALT_INPUT_SIZE)
            .with_expected_len(1024);
        let json = serde_json::to_string(&config).unwrap();
        let back: ModelVariantConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.runtime, RuntimeKind::QuantizedInterpreter);
        assert_eq!(back.input_size, ALT_INPUT_SIZE);
        assert_eq!(back.expected_len, Some(1024));
    }
}
