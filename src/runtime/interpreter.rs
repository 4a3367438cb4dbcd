//! Quantized on-device interpreter back end.
//!
//! Loads a precompiled mobile-inference graph with tract and runs it through
//! an execution plan. Unlike the full-graph session, the interpreter
//! requires an explicit tensor-buffer allocation step ([`QuantizedInterpreter::allocate`])
//! before the first prediction; a `predict` call issued earlier fails with
//! `Invocation{NotAllocated}` instead of touching uninitialized buffers.
//! Invocations are serialized through a mutex because the interpreter's
//! buffers are reused across calls.

use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::Tensor4D;
use crate::runtime::{validate_input_shape, Predictor};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tract_onnx::prelude::*;
use tracing::debug;

/// A loaded quantized-interpreter predictor.
pub struct QuantizedInterpreter {
    model: TypedModel,
    plan: Option<Mutex<TypedRunnableModel<TypedModel>>>,
    input_size: u32,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for QuantizedInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantizedInterpreter")
            .field("allocated", &self.plan.is_some())
            .field("input_size", &self.input_size)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl QuantizedInterpreter {
    /// Loads and optimizes the interpreter graph at `path`, declaring the
    /// input slot's type and `[1, S, S, 3]` shape.
    ///
    /// The handle is not ready to invoke until [`allocate`](Self::allocate)
    /// has run.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if the artifact is malformed or the runtime
    /// rejects it.
    pub fn load(path: &Path, input_size: u32, model_name: &str) -> ClassifyResult<Self> {
        let size = input_size as usize;
        let mut inference_model = tract_onnx::onnx().model_for_path(path).map_err(|e| {
            ClassifyError::model_load(path, "failed to read interpreter graph", e)
        })?;
        inference_model
            .set_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3)),
            )
            .map_err(|e| {
                ClassifyError::model_load(path, "failed to bind interpreter input slot", e)
            })?;
        let model = inference_model.into_optimized().map_err(|e| {
            ClassifyError::model_load(path, "failed to optimize interpreter graph", e)
        })?;

        debug!(model = model_name, "interpreter graph loaded");

        Ok(Self {
            model,
            plan: None,
            input_size,
            model_name: model_name.to_string(),
            model_path: path.to_path_buf(),
        })
    }

    /// Allocates the interpreter's tensor buffers by building the runnable
    /// execution plan. Must be called once before the first prediction.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if plan construction fails.
    pub fn allocate(&mut self) -> ClassifyResult<()> {
        let plan = self.model.clone().into_runnable().map_err(|e| {
            ClassifyError::model_load(
                &self.model_path,
                "failed to allocate interpreter execution plan",
                e,
            )
        })?;
        self.plan = Some(Mutex::new(plan));
        debug!(model = %self.model_name, "interpreter buffers allocated");
        Ok(())
    }

    /// Whether the tensor buffers have been allocated.
    pub fn is_allocated(&self) -> bool {
        self.plan.is_some()
    }

    /// Returns the local artifact path this handle was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Predictor for QuantizedInterpreter {
    fn predict(&self, input: &Tensor4D) -> ClassifyResult<Vec<f32>> {
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| ClassifyError::not_allocated(self.model_name.as_str()))?;

        validate_input_shape(input, self.input_size, &self.model_name)?;

        let size = self.input_size as usize;
        let data = input.as_slice().ok_or_else(|| {
            ClassifyError::invalid_input("input tensor is not contiguous in standard layout")
        })?;
        let tensor = Tensor::from_shape(&[1, size, size, 3], data)
            .map_err(ClassifyError::inference_error)?;

        let plan = plan.lock().map_err(|_| {
            ClassifyError::invalid_input(format!(
                "failed to acquire interpreter lock for model '{}'",
                self.model_name
            ))
        })?;

        let outputs = plan
            .run(tvec!(tensor.into_tvalue()))
            .map_err(ClassifyError::inference_error)?;
        let output = outputs.first().ok_or_else(|| {
            ClassifyError::invalid_input(format!(
                "model '{}' produced no output tensors",
                self.model_name
            ))
        })?;
        let values = output
            .as_slice::<f32>()
            .map_err(ClassifyError::inference_error)?;

        Ok(values.to_vec())
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
