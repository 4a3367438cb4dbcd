//! The fixed snack class label contract.
//!
//! The label list is positionally aligned with the model's output vector:
//! index `i` of a prediction vector scores the `i`-th label below. The
//! ordering is a contract between the training artifact and this code and
//! must never be reordered independently of the model. The presentation
//! layer keys its static history and recipe text by these same identifiers.

use crate::core::constants::NUM_CLASSES;

const SNACK_LABELS: [&str; NUM_CLASSES] = [
    "bika ambon",
    "cenil",
    "clorot",
    "gethuk",
    "grontol",
    "kelepon",
    "kue lapis",
    "kue lumpur",
    "lemper",
    "lupis",
    "nagasari",
    "onde-onde",
    "putu ayu",
    "serabi",
];

/// Gets the fixed, ordered snack class labels.
///
/// # Returns
///
/// A vector of the 14 snack class identifiers, in model output order.
pub fn snack_labels() -> Vec<String> {
    SNACK_LABELS.iter().map(|label| label.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_cardinality_matches_the_model_contract() {
        assert_eq!(snack_labels().len(), NUM_CLASSES);
        assert_eq!(snack_labels().len(), 14);
    }

    #[test]
    fn label_ordering_is_stable() {
        let labels = snack_labels();
        assert_eq!(labels[0], "bika ambon");
        assert_eq!(labels[5], "kelepon");
        assert_eq!(labels[13], "serabi");
    }

    #[test]
    fn labels_are_unique() {
        let labels = snack_labels();
        let mut deduped = labels.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), labels.len());
    }
}
