//! Model runtime adapters.
//!
//! Two divergent runtime back ends are supported behind one narrow
//! capability contract: a full-graph ONNX Runtime session and a quantized
//! on-device interpreter. The orchestration layer depends only on the
//! [`Predictor`] trait, never on back-end-specific types.

mod full_graph;
mod interpreter;

pub use full_graph::FullGraphModel;
pub use interpreter::QuantizedInterpreter;

use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::{ModelVariantConfig, RuntimeKind, Tensor4D};

/// The capability every runtime back end provides: one forward pass over a
/// preprocessed image tensor, producing one raw class-probability vector.
///
/// Implementations must reject mismatched input shapes explicitly rather
/// than producing garbage output, and must be safe to share across threads
/// (each back end serializes its own invocation primitive internally).
pub trait Predictor: Send + Sync + std::fmt::Debug {
    /// Feeds the tensor through the model and returns the output values,
    /// unbatched.
    fn predict(&self, input: &Tensor4D) -> ClassifyResult<Vec<f32>>;

    /// The square input resolution this handle was loaded with.
    fn input_size(&self) -> u32;

    /// The model name used in logs and error messages.
    fn model_name(&self) -> &str;
}

/// Loads the back end named by the config into a ready-to-invoke handle.
///
/// For the interpreter variant this includes the explicit tensor-buffer
/// allocation step, so the returned handle is always ready for `predict`.
pub fn load_predictor(config: &ModelVariantConfig) -> ClassifyResult<Box<dyn Predictor>> {
    match config.runtime {
        RuntimeKind::FullGraph => {
            let model = FullGraphModel::load(
                &config.artifact_path,
                config.input_size,
                &config.model_name,
            )?;
            Ok(Box::new(model))
        }
        RuntimeKind::QuantizedInterpreter => {
            let mut interpreter = QuantizedInterpreter::load(
                &config.artifact_path,
                config.input_size,
                &config.model_name,
            )?;
            interpreter.allocate()?;
            Ok(Box::new(interpreter))
        }
    }
}

/// Rejects tensors whose shape differs from the `[1, S, S, 3]` the handle
/// was loaded with.
pub(crate) fn validate_input_shape(
    input: &Tensor4D,
    input_size: u32,
    model_name: &str,
) -> ClassifyResult<()> {
    let size = input_size as usize;
    let expected = [1, size, size, 3];
    if input.shape() != expected {
        return Err(ClassifyError::shape_mismatch(
            model_name,
            &expected,
            input.shape(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::InvocationFailure;

    #[test]
    fn matching_shape_passes_validation() {
        let tensor = Tensor4D::zeros((1, 224, 224, 3));
        assert!(validate_input_shape(&tensor, 224, "test").is_ok());
    }

    #[test]
    fn wrong_spatial_size_is_a_shape_mismatch() {
        let tensor = Tensor4D::zeros((1, 256, 256, 3));
        let err = validate_input_shape(&tensor, 224, "test").unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Invocation {
                kind: InvocationFailure::ShapeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn wrong_batch_size_is_a_shape_mismatch() {
        let tensor = Tensor4D::zeros((2, 224, 224, 3));
        assert!(validate_input_shape(&tensor, 224, "test").is_err());
    }
}
