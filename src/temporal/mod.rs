//! Natural-language date/time extraction.

mod extractor;

pub use extractor::{TemporalExtractor, TemporalReference};
