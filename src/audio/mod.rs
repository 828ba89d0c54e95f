//! Audio decoding

pub mod decoder;

pub use decoder::{decode, TARGET_SAMPLE_RATE};
