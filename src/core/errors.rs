//! Error types for the classification pipeline.
//!
//! This module defines the error taxonomy shared by every stage of the
//! pipeline: artifact fetching, model loading, invocation, and image
//! preprocessing. Each stage fails fast and surfaces a typed error to its
//! caller; no stage swallows an error and substitutes a default prediction.

use std::path::Path;
use thiserror::Error;

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// The failure class of an artifact fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// The retrieval did not complete with a success status.
    Network,
    /// The local write failed (disk full, permissions).
    Write,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Network => write!(f, "network"),
            FetchFailure::Write => write!(f, "write"),
        }
    }
}

/// The failure class of a model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationFailure {
    /// The bound tensor's shape does not match the runtime's expected input.
    ShapeMismatch {
        /// The shape the model was loaded with.
        expected: Vec<usize>,
        /// The shape of the tensor handed to `predict`.
        actual: Vec<usize>,
    },
    /// `predict` was called before the interpreter's tensor buffers were
    /// allocated.
    NotAllocated,
}

impl std::fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationFailure::ShapeMismatch { expected, actual } => write!(
                f,
                "input shape {actual:?} does not match expected {expected:?}"
            ),
            InvocationFailure::NotAllocated => {
                write!(f, "interpreter tensor buffers are not allocated")
            }
        }
    }
}

/// Enum representing the errors that can occur in the classification pipeline.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Error occurred while fetching a model artifact.
    #[error("artifact fetch ({kind}) failed: {context}")]
    Fetch {
        /// The failure class (network or local write).
        kind: FetchFailure,
        /// Additional context about the error.
        context: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred while loading a model artifact into a runtime.
    #[error("model load failed for '{path}': {context}")]
    ModelLoad {
        /// The local artifact path that was rejected.
        path: String,
        /// Additional context about the error.
        context: String,
        /// The underlying runtime error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while invoking a loaded model.
    #[error("invocation failed for model '{model}': {kind}")]
    Invocation {
        /// The failure class (shape mismatch or missing allocation).
        kind: InvocationFailure,
        /// The name of the model being invoked.
        model: String,
    },

    /// Error indicating the input image cannot be coerced to 3-channel color.
    #[error("unsupported image format: {context}")]
    UnsupportedFormat {
        /// Additional context about the error.
        context: String,
        /// The underlying decode error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred during a forward pass, other than a shape or
    /// allocation problem.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl ClassifyError {
    /// Creates a network-class fetch error with an underlying source.
    pub fn fetch_network(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            kind: FetchFailure::Network,
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a network-class fetch error without an underlying source
    /// (e.g. a non-success HTTP status).
    pub fn fetch_network_status(context: impl Into<String>) -> Self {
        Self::Fetch {
            kind: FetchFailure::Network,
            context: context.into(),
            source: None,
        }
    }

    /// Creates a write-class fetch error.
    pub fn fetch_write(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            kind: FetchFailure::Write,
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a model load error for a rejected or malformed artifact.
    pub fn model_load(
        path: &Path,
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ModelLoad {
            path: path.display().to_string(),
            context: context.into(),
            source: source.into(),
        }
    }

    /// Creates an invocation error for a mismatched input shape.
    pub fn shape_mismatch(model: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::Invocation {
            kind: InvocationFailure::ShapeMismatch {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            },
            model: model.into(),
        }
    }

    /// Creates an invocation error for a prediction issued before the
    /// interpreter's buffers were allocated.
    pub fn not_allocated(model: impl Into<String>) -> Self {
        Self::Invocation {
            kind: InvocationFailure::NotAllocated,
            model: model.into(),
        }
    }

    /// Creates an error for an image that cannot be coerced to 3-channel
    /// color.
    pub fn unsupported_format(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::UnsupportedFormat {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a ClassifyError for forward-pass failures.
    pub fn inference_error(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Inference(source.into())
    }

    /// Creates a ClassifyError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ClassifyError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

}

impl From<image::ImageError> for ClassifyError {
    fn from(error: image::ImageError) -> Self {
        Self::UnsupportedFormat {
            context: "image decode failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_classes_are_distinguishable() {
        let network = ClassifyError::fetch_network_status("status 404");
        let write = ClassifyError::fetch_write(
            "disk full",
            std::io::Error::new(std::io::ErrorKind::Other, "no space"),
        );

        assert!(matches!(
            network,
            ClassifyError::Fetch {
                kind: FetchFailure::Network,
                ..
            }
        ));
        assert!(matches!(
            write,
            ClassifyError::Fetch {
                kind: FetchFailure::Write,
                ..
            }
        ));
    }

    #[test]
    fn shape_mismatch_reports_both_shapes() {
        let err = ClassifyError::shape_mismatch("snack_resnet50", &[1, 224, 224, 3], &[1, 256, 256, 3]);
        let message = err.to_string();
        assert!(message.contains("[1, 224, 224, 3]"));
        assert!(message.contains("[1, 256, 256, 3]"));
    }

    #[test]
    fn not_allocated_names_the_model() {
        let err = ClassifyError::not_allocated("snack_mobile");
        assert!(err.to_string().contains("snack_mobile"));
        assert!(matches!(
            err,
            ClassifyError::Invocation {
                kind: InvocationFailure::NotAllocated,
                ..
            }
        ));
    }
}
