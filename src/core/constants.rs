//! Constants used throughout the classification pipeline.

/// The number of snack classes the models are trained on.
///
/// This count is a contract between the training artifact and the inference
/// code; the label list in [`crate::domain`] is positionally aligned with the
/// model output and must have exactly this many entries.
pub const NUM_CLASSES: usize = 14;

/// The default number of top results reported alongside the arg-max class.
pub const DEFAULT_TOP_K: usize = 5;

/// The default square input resolution for classification.
///
/// The resolution is a property of the bound model variant, not a user
/// choice; this is the size used by the full-graph ResNet-50 variant.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// The alternative square input resolution used by some model variants.
pub const ALT_INPUT_SIZE: u32 = 256;

/// Per-channel RGB means for mean-centered normalization.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel RGB standard deviations for mean-centered normalization.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
