//! External tool abstractions
//!
//! Trait-based wrapper around the source-to-source converter the migration
//! hands its file to, so the pipeline can be tested without the real tool.

pub mod converter;

pub use converter::{ConversionOutcome, ConvertError, Converter, ProcessConverter};
