//! The inference pipeline.
//!
//! Orchestrates fetch -> load -> preprocess -> predict -> rank for one model
//! variant. The expensive fetch-and-load sequence runs at most once per
//! classifier regardless of concurrent first-time requests; the resulting
//! handle is cached for the lifetime of the classifier and never
//! invalidated. A failed initialization is surfaced verbatim to the caller
//! and leaves nothing cached, so a later request retries from the fetch.

pub mod result;

pub use result::{ClassScore, RankedResult};

use crate::artifact::ensure_local_artifact;
use crate::core::constants::DEFAULT_TOP_K;
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::{ModelVariantConfig, Tensor4D};
use crate::domain::snack_labels;
use crate::preprocess::preprocess;
use crate::runtime::{load_predictor, Predictor};
use image::DynamicImage;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// The observable lifecycle of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No inference request has arrived yet.
    Idle,
    /// The model artifact is being downloaded.
    Fetching,
    /// The artifact is being loaded into a runtime.
    Loading,
    /// The handle is cached and ready to invoke.
    Ready,
    /// A forward pass is in flight.
    Predicting,
    /// The most recent request completed.
    Done,
    /// The most recent transition failed; the error was surfaced to the
    /// caller.
    Failed,
}

/// Produces a ready-to-invoke predictor for a model variant.
///
/// The default factory loads the artifact with the back end named in the
/// config; swapping it is the seam for custom runtimes and for tests.
pub type RuntimeFactory =
    Box<dyn Fn(&ModelVariantConfig) -> ClassifyResult<Box<dyn Predictor>> + Send + Sync>;

/// Classifies snack photographs with one configured model variant.
///
/// The classifier owns the model handle exclusively; once loaded it is
/// shared read-mostly across requests, and each back end serializes its own
/// invocation primitive. `ImageTensor`, prediction vectors, and ranked
/// results are created fresh per request.
pub struct SnackClassifier {
    config: ModelVariantConfig,
    labels: Vec<Arc<str>>,
    top_k: usize,
    handle: OnceCell<Box<dyn Predictor>>,
    state: RwLock<PipelineState>,
    runtime_factory: RuntimeFactory,
}

impl std::fmt::Debug for SnackClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnackClassifier")
            .field("config", &self.config)
            .field("loaded", &self.handle.get().is_some())
            .field("state", &self.state())
            .finish()
    }
}

impl SnackClassifier {
    /// Creates a classifier for the given model variant.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the variant configuration is invalid.
    pub fn new(config: ModelVariantConfig) -> ClassifyResult<Self> {
        Self::with_runtime_factory(config, Box::new(load_predictor))
    }

    /// Creates a classifier with a custom runtime factory.
    ///
    /// The factory replaces only the artifact-loading step; fetching and
    /// the single-initialization guarantee stay with the pipeline.
    pub fn with_runtime_factory(
        config: ModelVariantConfig,
        runtime_factory: RuntimeFactory,
    ) -> ClassifyResult<Self> {
        config.validate()?;
        let top_k = config.top_k.unwrap_or(DEFAULT_TOP_K);
        Ok(Self {
            config,
            labels: snack_labels().into_iter().map(Arc::from).collect(),
            top_k,
            handle: OnceCell::new(),
            state: RwLock::new(PipelineState::Idle),
            runtime_factory,
        })
    }

    /// The current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or(PipelineState::Failed)
    }

    /// The fixed class labels, in model output order.
    pub fn labels(&self) -> &[Arc<str>] {
        &self.labels
    }

    /// The model variant configuration this classifier was built with.
    pub fn config(&self) -> &ModelVariantConfig {
        &self.config
    }

    fn set_state(&self, next: PipelineState) {
        if let Ok(mut state) = self.state.write() {
            *state = next;
        }
    }

    /// Returns the cached model handle, running the fetch-and-load sequence
    /// on the first call. Concurrent first-time callers block until the one
    /// in-flight initialization completes; a failed initialization caches
    /// nothing, so the next request retries the fetch.
    fn handle(&self) -> ClassifyResult<&dyn Predictor> {
        let handle = self.handle.get_or_try_init(|| {
            self.set_state(PipelineState::Fetching);
            ensure_local_artifact(
                &self.config.source_url,
                &self.config.artifact_path,
                self.config.expected_len,
            )
            .map_err(|e| {
                self.set_state(PipelineState::Failed);
                e
            })?;

            self.set_state(PipelineState::Loading);
            let predictor = (self.runtime_factory)(&self.config).map_err(|e| {
                self.set_state(PipelineState::Failed);
                e
            })?;

            self.set_state(PipelineState::Ready);
            info!(model = %self.config.model_name, "model handle initialized");
            Ok::<_, ClassifyError>(predictor)
        })?;
        Ok(handle.as_ref())
    }

    /// Runs one inference request over an already-decoded image.
    ///
    /// Blocks until fetch (if needed), load (if needed), preprocessing, and
    /// the forward pass all complete; there is no internal parallelism,
    /// auto-retry, or timeout.
    pub fn classify(&self, image: &DynamicImage) -> ClassifyResult<RankedResult> {
        let predictor = self.handle()?;
        self.set_state(PipelineState::Predicting);

        let tensor = self.preprocess_image(image).map_err(|e| {
            self.set_state(PipelineState::Failed);
            e
        })?;
        let probabilities = predictor.predict(&tensor).map_err(|e| {
            self.set_state(PipelineState::Failed);
            e
        })?;
        debug!(
            model = %self.config.model_name,
            classes = probabilities.len(),
            "forward pass complete"
        );

        let ranked = RankedResult::from_probabilities(&probabilities, &self.labels, self.top_k)
            .map_err(|e| {
                self.set_state(PipelineState::Failed);
                e
            })?;

        self.set_state(PipelineState::Done);
        Ok(ranked)
    }

    /// Decodes an image from disk and runs one inference request over it.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if the file cannot be decoded to
    /// 3-channel color, plus everything [`classify`](Self::classify) can
    /// return.
    pub fn classify_path(&self, path: &Path) -> ClassifyResult<RankedResult> {
        let image = image::open(path).map_err(|e| {
            ClassifyError::unsupported_format(
                format!("failed to decode image at '{}'", path.display()),
                e,
            )
        })?;
        self.classify(&image)
    }

    fn preprocess_image(&self, image: &DynamicImage) -> ClassifyResult<Tensor4D> {
        preprocess(image, self.config.input_size, self.config.normalization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{FetchFailure, InvocationFailure};
    use crate::runtime::validate_input_shape;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubPredictor {
        probabilities: Vec<f32>,
        input_size: u32,
    }

    impl Predictor for StubPredictor {
        fn predict(&self, input: &Tensor4D) -> ClassifyResult<Vec<f32>> {
            validate_input_shape(input, self.input_size, self.model_name())?;
            Ok(self.probabilities.clone())
        }

        fn input_size(&self) -> u32 {
            self.input_size
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    /// Config whose artifact already exists, so no fetch is attempted, and
    /// whose URL is unreachable, so any attempted fetch would fail loudly.
    fn offline_config(dir: &tempfile::TempDir) -> ModelVariantConfig {
        let artifact = dir.path().join("model.onnx");
        std::fs::write(&artifact, b"stub artifact").unwrap();
        ModelVariantConfig::resnet50_full()
            .with_source_url("http://127.0.0.1:1/model.onnx")
            .with_artifact_path(artifact)
    }

    fn stub_factory(probabilities: Vec<f32>, calls: Arc<AtomicUsize>) -> RuntimeFactory {
        Box::new(move |config| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubPredictor {
                probabilities: probabilities.clone(),
                input_size: config.input_size,
            }))
        })
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::new(64, 48))
    }

    #[test]
    fn end_to_end_ranking_reports_the_last_class() {
        let dir = tempfile::tempdir().unwrap();
        let mut probabilities = vec![0.01f32; 14];
        probabilities[13] = 0.87;
        let classifier = SnackClassifier::with_runtime_factory(
            offline_config(&dir),
            stub_factory(probabilities, Arc::new(AtomicUsize::new(0))),
        )
        .unwrap();

        let result = classifier.classify(&test_image()).unwrap();
        assert_eq!(result.class_id, 13);
        assert_eq!(result.label.as_ref(), "serabi");
        assert!((result.confidence_percent() - 87.0).abs() < 1e-4);
        assert_eq!(result.top_k.len(), 5);
        assert_eq!(result.top_k[0].class_id, 13);
        assert_eq!(classifier.state(), PipelineState::Done);
    }

    #[test]
    fn concurrent_first_requests_initialize_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = SnackClassifier::with_runtime_factory(
            offline_config(&dir),
            stub_factory(vec![1.0 / 14.0; 14], calls.clone()),
        )
        .unwrap();

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let classifier = &classifier;
                    scope.spawn(move || classifier.classify(&test_image()))
                })
                .collect();
            for worker in workers {
                assert!(worker.join().unwrap().is_ok());
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_initialization_is_retried_on_the_next_request() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_factory = calls.clone();
        let factory: RuntimeFactory = Box::new(move |config| {
            if calls_in_factory.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClassifyError::config_error("simulated load failure"))
            } else {
                Ok(Box::new(StubPredictor {
                    probabilities: vec![1.0 / 14.0; 14],
                    input_size: config.input_size,
                }))
            }
        });
        let classifier =
            SnackClassifier::with_runtime_factory(offline_config(&dir), factory).unwrap();

        assert!(classifier.classify(&test_image()).is_err());
        assert_eq!(classifier.state(), PipelineState::Failed);

        assert!(classifier.classify(&test_image()).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(classifier.state(), PipelineState::Done);
    }

    #[test]
    fn unreachable_artifact_surfaces_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelVariantConfig::resnet50_full()
            .with_source_url("http://127.0.0.1:1/model.onnx")
            .with_artifact_path(dir.path().join("missing.onnx"));
        let classifier = SnackClassifier::with_runtime_factory(
            config,
            stub_factory(vec![1.0 / 14.0; 14], Arc::new(AtomicUsize::new(0))),
        )
        .unwrap();

        let err = classifier.classify(&test_image()).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Fetch {
                kind: FetchFailure::Network,
                ..
            }
        ));
        assert_eq!(classifier.state(), PipelineState::Failed);
    }

    #[test]
    fn shape_mismatch_from_the_handle_is_surfaced_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        // Stub expects 256 while the config preprocesses to 224.
        let factory: RuntimeFactory = Box::new(|_config| {
            Ok(Box::new(StubPredictor {
                probabilities: vec![1.0 / 14.0; 14],
                input_size: 256,
            }))
        });
        let classifier =
            SnackClassifier::with_runtime_factory(offline_config(&dir), factory).unwrap();

        let err = classifier.classify(&test_image()).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Invocation {
                kind: InvocationFailure::ShapeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn states_start_idle_and_reach_ready_after_first_request() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = SnackClassifier::with_runtime_factory(
            offline_config(&dir),
            stub_factory(vec![1.0 / 14.0; 14], Arc::new(AtomicUsize::new(0))),
        )
        .unwrap();

        assert_eq!(classifier.state(), PipelineState::Idle);
        classifier.classify(&test_image()).unwrap();
        assert_eq!(classifier.state(), PipelineState::Done);
        // The handle stays cached for subsequent requests.
        classifier.classify(&test_image()).unwrap();
    }

    #[test]
    fn undecodable_file_is_an_unsupported_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not_an_image.jpg");
        std::fs::write(&bogus, b"definitely not a jpeg").unwrap();
        let classifier = SnackClassifier::with_runtime_factory(
            offline_config(&dir),
            stub_factory(vec![1.0 / 14.0; 14], Arc::new(AtomicUsize::new(0))),
        )
        .unwrap();

        let err = classifier.classify_path(&bogus).unwrap_err();
        assert!(matches!(err, ClassifyError::UnsupportedFormat { .. }));
    }
}
