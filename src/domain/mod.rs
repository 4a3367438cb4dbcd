//! Domain types for snack classification.

pub mod labels;

pub use labels::snack_labels;
