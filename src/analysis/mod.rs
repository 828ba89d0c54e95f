//! Beat analysis
//!
//! This module provides the tracker trait and concrete implementations.
//! The trait abstraction allows swapping backends without changing pipeline
//! code.

pub mod envelope;
pub mod traits;

pub use envelope::EnvelopeTracker;
pub use traits::{BeatTracker, TrackerMethod};
