//! Full-graph runtime back end.
//!
//! Loads a serialized ONNX computation graph into an ONNX Runtime session
//! and runs single-image forward passes over it. The session is guarded by a
//! mutex because `Session::run` needs exclusive access; once loaded, the
//! handle is shared read-mostly across requests.

use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::Tensor4D;
use crate::runtime::{validate_input_shape, Predictor};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// A loaded full-graph predictor.
pub struct FullGraphModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_size: u32,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for FullGraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullGraphModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_size", &self.input_size)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl FullGraphModel {
    /// Loads the serialized graph at `path` and discovers its input and
    /// output tensor names from the session metadata.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if the artifact is malformed or the runtime
    /// rejects it, or if the graph declares no inputs or outputs.
    pub fn load(path: &Path, input_size: u32, model_name: &str) -> ClassifyResult<Self> {
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(path)
            .map_err(|e| ClassifyError::model_load(path, "failed to create ONNX session", e))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                ClassifyError::invalid_input(format!(
                    "model '{model_name}' declares no inputs - artifact may be corrupted"
                ))
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ClassifyError::invalid_input(format!(
                    "model '{model_name}' declares no outputs - artifact may be corrupted"
                ))
            })?;

        debug!(
            model = model_name,
            input = %input_name,
            output = %output_name,
            "full-graph session ready"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_size,
            model_name: model_name.to_string(),
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the local artifact path this handle was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Predictor for FullGraphModel {
    fn predict(&self, input: &Tensor4D) -> ClassifyResult<Vec<f32>> {
        validate_input_shape(input, self.input_size, &self.model_name)?;

        let input_tensor =
            TensorRef::from_array_view(input.view()).map_err(ClassifyError::inference_error)?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            ClassifyError::invalid_input(format!(
                "failed to acquire session lock for model '{}'",
                self.model_name
            ))
        })?;

        let outputs = session.run(inputs)?;
        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(ClassifyError::Session)?;

        // Accept [1, C] or plain [C]; anything else is not a classification
        // head we can unbatch.
        let class_count = match output_shape.len() {
            1 => output_shape[0] as usize,
            2 if output_shape[0] == 1 => output_shape[1] as usize,
            _ => {
                return Err(ClassifyError::invalid_input(format!(
                    "model '{}' returned output shape {:?}, expected [1, C] or [C]",
                    self.model_name, output_shape
                )));
            }
        };

        if output_data.len() != class_count {
            return Err(ClassifyError::invalid_input(format!(
                "model '{}' output data size mismatch: expected {}, got {}",
                self.model_name,
                class_count,
                output_data.len()
            )));
        }

        Ok(output_data.to_vec())
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
