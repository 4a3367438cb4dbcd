//! Image preprocessing for snack classification.
//!
//! Converts an arbitrary-resolution, arbitrary-format image into the
//! fixed-size, normalized `[1, S, S, 3]` tensor a given model variant
//! expects. Two normalization conventions are supported; the convention is a
//! property of the bound model variant and must be passed explicitly.

use crate::core::constants::{IMAGENET_MEAN, IMAGENET_STD};
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::core::{Normalization, Tensor4D};
use image::imageops::{self, FilterType};
use image::DynamicImage;

/// Converts an image into a normalized batch-of-one NHWC tensor.
///
/// The image is forced to 3-channel color, stretch-resized (non
/// aspect-preserving) to `target_size` x `target_size`, converted to f32,
/// and normalized per the selected convention. The output shape is always
/// exactly `[1, target_size, target_size, 3]`, and the result is
/// deterministic for a given input and configuration.
///
/// # Errors
///
/// Returns `InvalidInput` if `target_size` is zero. Decode failures for
/// images that cannot be coerced to 3-channel color surface as
/// `UnsupportedFormat` at the decode boundary (see
/// [`crate::pipeline::SnackClassifier::classify_path`]).
pub fn preprocess(
    image: &DynamicImage,
    target_size: u32,
    normalization: Normalization,
) -> ClassifyResult<Tensor4D> {
    if target_size == 0 {
        return Err(ClassifyError::invalid_input(
            "preprocess target size must be greater than 0",
        ));
    }

    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, target_size, target_size, FilterType::Triangle);

    let size = target_size as usize;
    let mut tensor = Tensor4D::zeros((1, size, size, 3));
    for y in 0..size {
        for x in 0..size {
            let pixel = resized.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                tensor[[0, y, x, c]] = match normalization {
                    Normalization::UnitScale => value,
                    Normalization::MeanCentered => (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c],
                };
            }
        }
    }

    Ok(tensor)
}
