//! Message intent classification.

mod classifier;

pub use classifier::{Intent, IntentClassifier};
