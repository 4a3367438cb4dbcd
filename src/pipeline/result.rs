//! Ranked classification results.

use crate::core::errors::{ClassifyError, ClassifyResult};
use std::sync::Arc;

/// One class-probability entry of a ranked result.
#[derive(Debug, Clone)]
pub struct ClassScore {
    /// Index of the class in the fixed label list.
    pub class_id: usize,
    /// The class label.
    pub label: Arc<str>,
    /// The raw probability the model assigned to this class.
    pub probability: f32,
}

/// A ranked, labeled view over one prediction vector.
///
/// The top-K entries are sorted descending by probability with ties broken
/// by original class-index order (stable sort). Probabilities are a single
/// forward-pass output and are not guaranteed to sum to 1 unless the model's
/// final layer is a normalized distribution.
#[derive(Debug, Clone)]
pub struct RankedResult {
    /// Index of the arg-max class.
    pub class_id: usize,
    /// Label of the arg-max class.
    pub label: Arc<str>,
    /// Raw probability of the arg-max class.
    pub confidence: f32,
    /// The top-K entries, descending by probability.
    pub top_k: Vec<ClassScore>,
}

impl RankedResult {
    /// Builds a ranked result from a raw probability vector.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the probability count differs from the
    /// label count, or if the vector is empty.
    pub fn from_probabilities(
        probabilities: &[f32],
        labels: &[Arc<str>],
        k: usize,
    ) -> ClassifyResult<Self> {
        if probabilities.is_empty() {
            return Err(ClassifyError::invalid_input("empty prediction vector"));
        }
        if probabilities.len() != labels.len() {
            return Err(ClassifyError::invalid_input(format!(
                "prediction vector has {} entries but the label list has {}",
                probabilities.len(),
                labels.len()
            )));
        }

        let mut ranked: Vec<ClassScore> = probabilities
            .iter()
            .enumerate()
            .map(|(class_id, &probability)| ClassScore {
                class_id,
                label: labels[class_id].clone(),
                probability,
            })
            .collect();

        // Stable descending sort: equal probabilities keep original
        // class-index order.
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(k.min(probabilities.len()));

        let top = ranked[0].clone();
        Ok(Self {
            class_id: top.class_id,
            label: top.label,
            confidence: top.probability,
            top_k: ranked,
        })
    }

    /// The arg-max confidence as a percentage.
    ///
    /// No rounding is applied here; one-decimal formatting belongs to the
    /// presentation boundary.
    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }
}
